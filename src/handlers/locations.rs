use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, handlers::AppState,
    services::locations::LocationRequest,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, put},
    Router,
};

pub async fn create_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<LocationRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let location = state
        .services
        .locations
        .create_location(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(location))
}

pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let locations = state
        .services
        .locations
        .list_locations()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(locations))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let location = state
        .services
        .locations
        .get_location(location_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Location {} not found", location_id)))?;

    Ok(success_response(location))
}

pub async fn update_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(location_id): Path<i32>,
    Json(payload): Json<LocationRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let location = state
        .services
        .locations
        .update_location(location_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(location_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .locations
        .delete_location(location_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Creates the router for location endpoints
pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/:location_id", get(get_location))
        .route("/:location_id", put(update_location))
        .route("/:location_id", delete(delete_location))
}
