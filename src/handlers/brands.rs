use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    services::brands::{CreateBrandRequest, UpdateBrandRequest},
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, put},
    Router,
};
use tracing::info;

pub async fn create_brand(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateBrandRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let brand = state
        .services
        .brands
        .create_brand(payload)
        .await
        .map_err(map_service_error)?;

    info!("Brand created: {}", brand.brand_id);
    Ok(created_response(brand))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let brand = state
        .services
        .brands
        .get_brand(brand_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Brand {} not found", brand_id)))?;

    Ok(success_response(brand))
}

pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let brands = state
        .services
        .brands
        .list_brands()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(brands))
}

pub async fn update_brand(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(brand_id): Path<i32>,
    Json(payload): Json<UpdateBrandRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let brand = state
        .services
        .brands
        .update_brand(brand_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(brand))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(brand_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .brands
        .delete_brand(brand_id)
        .await
        .map_err(map_service_error)?;

    info!("Brand deleted: {}", brand_id);
    Ok(no_content_response())
}

/// Creates the router for brand endpoints
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/:brand_id", get(get_brand))
        .route("/:brand_id", put(update_brand))
        .route("/:brand_id", delete(delete_brand))
}
