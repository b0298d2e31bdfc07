use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, handlers::AppState,
    services::transactions::CreateTransactionRequest,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get},
    Router,
};
use tracing::info;

/// Record a multi-line sale, deducting stock per line
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    responses(
        (status = 201, description = "Transaction recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item or location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice reference already used", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let response = state
        .services
        .transactions
        .create_transaction(payload, &user)
        .await
        .map_err(map_service_error)?;

    info!(
        "Transaction recorded: {} ({})",
        response.transaction.transaction_id, response.transaction.invoice_reference
    );
    Ok(created_response(response))
}

/// Get a transaction with its line items
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let response = state
        .services
        .transactions
        .get_transaction(transaction_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(response))
}

/// List all transactions with their line items
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    responses((status = 200, description = "Transactions returned")),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let transactions = state
        .services
        .transactions
        .list_transactions()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(transactions))
}

/// Delete a transaction, restoring the sold stock
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 204, description = "Transaction deleted and stock restored"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(transaction_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .transactions
        .delete_transaction(transaction_id)
        .await
        .map_err(map_service_error)?;

    info!("Transaction deleted: {}", transaction_id);
    Ok(no_content_response())
}

/// Creates the router for transaction endpoints
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:transaction_id", get(get_transaction))
        .route("/:transaction_id", delete(delete_transaction))
}
