//! Pocket Ledger is a small personal finance ledger service.
//!
//! Clients record credits and debits and read back their own transaction
//! history and running balance. There are no user accounts: each client is
//! identified by an anonymous session cookie that is minted on its first
//! write.
//!
//! This library provides the JSON API, the SQLite storage and the session
//! handling. The `server` binary wires them together.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod logging;
mod routing;
mod session;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{DEFAULT_SESSION_DURATION, SESSION_COOKIE, SessionId};
pub use transaction::{
    NewTransaction, Transaction, TransactionType, ValidationIssue, create_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields of the request failed validation.
    ///
    /// Each issue names the offending field so the client can fix its input.
    #[error("validation failed: {0:?}")]
    Validation(Vec<ValidationIssue>),

    /// The request body was missing, was not JSON, or had the wrong content type.
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// The request body was larger than the server accepts.
    #[error("the request body is too large")]
    PayloadTooLarge,

    /// A protected endpoint was called without a session cookie.
    #[error("no session cookie in the request")]
    SessionMissing,

    /// The requested resource was not found.
    ///
    /// Transactions that belong to another session are reported as not found
    /// as well, so clients cannot probe for other sessions' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The sum of a session's transactions does not fit in an `i64`.
    #[error("the balance is out of range")]
    BalanceOutOfRange,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<ValidationIssue>,
}

fn error_response(status_code: StatusCode, message: &str, issues: Vec<ValidationIssue>) -> Response {
    (
        status_code,
        Json(ErrorBody {
            message: message.to_owned(),
            issues,
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(issues) => {
                error_response(StatusCode::BAD_REQUEST, "Validation error.", issues)
            }
            Error::InvalidJson(reason) => error_response(
                StatusCode::BAD_REQUEST,
                "Validation error.",
                vec![ValidationIssue::new("body", &reason)],
            ),
            Error::PayloadTooLarge => error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body is too large.",
                Vec::new(),
            ),
            Error::BalanceOutOfRange => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "The balance is too large to represent.",
                Vec::new(),
            ),
            Error::SessionMissing => {
                error_response(StatusCode::UNAUTHORIZED, "Unauthorized.", Vec::new())
            }
            Error::NotFound => {
                error_response(StatusCode::NOT_FOUND, "Transaction not found.", Vec::new())
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.",
                    Vec::new(),
                )
            }
        }
    }
}
