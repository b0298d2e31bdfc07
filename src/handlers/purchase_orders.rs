use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::purchase_orders::{CreatePurchaseOrderRequest, UpdatePurchaseOrderRequest},
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, put},
    Router,
};
use tracing::info;

/// Create a purchase order, minting the item code and the counterpart
/// inventory record
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    responses(
        (status = 201, description = "Purchase order created with its minted item code"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Brand or location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let receipt = state
        .services
        .purchase_orders
        .create_purchase_order(payload, &user)
        .await
        .map_err(map_service_error)?;

    info!(
        "Purchase order created: {}",
        receipt.purchase_order.item_code
    );
    Ok(created_response(receipt))
}

/// Get a purchase order by item code
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{item_code}",
    params(("item_code" = String, Path, description = "Minted item code")),
    responses(
        (status = 200, description = "Purchase order returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .get_purchase_order(&item_code)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Purchase order {} not found", item_code))
        })?;

    Ok(success_response(order))
}

/// List all purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    responses((status = 200, description = "Purchase orders returned")),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .list_purchase_orders()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Update a purchase order's descriptive fields
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{item_code}",
    params(("item_code" = String, Path, description = "Minted item code")),
    responses(
        (status = 200, description = "Purchase order updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(item_code): Path<String>,
    Json(payload): Json<UpdatePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .purchase_orders
        .update_purchase_order(&item_code, payload, &user)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Delete a purchase order and its counterpart inventory
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{item_code}",
    params(("item_code" = String, Path, description = "Minted item code")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(item_code): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .purchase_orders
        .delete_purchase_order(&item_code)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order deleted: {}", item_code);
    Ok(no_content_response())
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route("/:item_code", get(get_purchase_order))
        .route("/:item_code", put(update_purchase_order))
        .route("/:item_code", delete(delete_purchase_order))
}
