//! Defines the endpoint for getting a single transaction.
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Error,
    session::SessionId,
    transaction::{
        Transaction, ValidationIssue, core::get_transaction, list_endpoint::TransactionState,
    },
};

/// The response body for getting a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The requested transaction.
    pub transaction: Transaction,
}

/// A route handler for getting one of the session's transactions by its ID.
///
/// The ID must be a UUID, this is checked before the database is queried.
/// Transactions created by other sessions are reported as not found.
///
/// Must be behind [crate::session::session_guard].
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session_id): Extension<SessionId>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, Error> {
    let transaction_id = Uuid::parse_str(&transaction_id).map_err(|error| {
        Error::Validation(vec![ValidationIssue::new(
            "id",
            &format!("Invalid uuid: {error}"),
        )])
    })?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = get_transaction(transaction_id, &session_id, &connection)?;

    Ok(Json(TransactionResponse { transaction }))
}
