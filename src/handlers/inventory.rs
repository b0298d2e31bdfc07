use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::inventory::{CreateInventoryRequest, UpdateInventoryRequest},
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StockAlertParams {
    /// Items at-or-below this aggregate quantity are reported
    pub threshold: i32,
}

/// Create an inventory item with its per-location stock
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    responses(
        (status = 201, description = "Inventory item created with its location breakdown"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Brand or location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateInventoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let created = state
        .services
        .inventory
        .create_inventory(payload, &user)
        .await
        .map_err(map_service_error)?;

    info!("Inventory created: {}", created.inventory.item_code);
    Ok(created_response(created))
}

/// Get one inventory item with its location breakdown
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{item_code}",
    params(("item_code" = String, Path, description = "Item code")),
    responses(
        (status = 200, description = "Inventory item returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = state
        .services
        .inventory
        .get_inventory(&item_code)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(payload))
}

/// List all inventory items with their location breakdowns
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses((status = 200, description = "Inventory list returned")),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payloads = state
        .services
        .inventory
        .list_inventories()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(payloads))
}

/// Update an inventory item, replacing its full location set
#[utoipa::path(
    put,
    path = "/api/v1/inventory/{item_code}",
    params(("item_code" = String, Path, description = "Item code")),
    responses(
        (status = 200, description = "Inventory item updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(item_code): Path<String>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let updated = state
        .services
        .inventory
        .update_inventory(&item_code, payload, &user)
        .await
        .map_err(map_service_error)?;

    info!("Inventory updated: {}", item_code);
    Ok(success_response(updated))
}

/// Delete an inventory item and its ledger rows
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{item_code}",
    params(("item_code" = String, Path, description = "Item code")),
    responses(
        (status = 204, description = "Inventory item deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(item_code): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .inventory
        .delete_inventory(&item_code)
        .await
        .map_err(map_service_error)?;

    info!("Inventory deleted: {}", item_code);
    Ok(no_content_response())
}

/// Items at-or-below a stock threshold
#[utoipa::path(
    get,
    path = "/api/v1/inventory/alerts",
    params(StockAlertParams),
    responses((status = 200, description = "Low-stock items returned")),
    tag = "inventory"
)]
pub async fn stock_alerts(
    State(state): State<AppState>,
    Query(params): Query<StockAlertParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .inventory
        .stock_alerts(params.threshold)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// All items sorted by quantity, highest first
#[utoipa::path(
    get,
    path = "/api/v1/inventory/highest-stock",
    responses((status = 200, description = "Items sorted by descending quantity")),
    tag = "inventory"
)]
pub async fn highest_stock(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .inventory
        .highest_stock()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// All items sorted by quantity, lowest first
#[utoipa::path(
    get,
    path = "/api/v1/inventory/lowest-stock",
    responses((status = 200, description = "Items sorted by ascending quantity")),
    tag = "inventory"
)]
pub async fn lowest_stock(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let items = state
        .services
        .inventory
        .lowest_stock()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Creates the router for inventory endpoints
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route("/alerts", get(stock_alerts))
        .route("/highest-stock", get(highest_stock))
        .route("/lowest-stock", get(lowest_stock))
        .route("/:item_code", get(get_inventory))
        .route("/:item_code", put(update_inventory))
        .route("/:item_code", delete(delete_inventory))
}
