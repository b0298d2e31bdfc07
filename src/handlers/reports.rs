use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardParams {
    /// One of `daily`, `monthly`, `yearly`
    pub period: String,
    /// Anchor date: `YYYY-MM-DD`, `YYYY-MM`, or `YYYY` depending on period
    pub date: Option<String>,
}

/// Transaction rollups for a reporting period
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    params(DashboardParams),
    responses(
        (status = 200, description = "Dashboard statistics returned"),
        (status = 400, description = "Invalid period or date", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let stats = state
        .services
        .dashboard
        .dashboard_stats(&params.period, params.date.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}

/// Creates the router for dashboard endpoints
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}
