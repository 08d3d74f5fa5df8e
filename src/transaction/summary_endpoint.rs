//! Defines the endpoint for the session's balance.
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    session::SessionId,
    transaction::{core::get_balance, list_endpoint::TransactionState},
};

/// The aggregate over a session's transactions.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the signed amounts, zero if there are no transactions.
    pub amount: i64,
}

/// The response body for the summary endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// The session's summary.
    pub summary: Summary,
}

/// A route handler for the sum of all of the session's transactions.
///
/// Must be behind [crate::session::session_guard].
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<SummaryResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let amount = get_balance(&session_id, &connection)?;

    Ok(Json(SummaryResponse {
        summary: Summary { amount },
    }))
}
