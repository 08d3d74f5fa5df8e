//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    session::get_or_mint_session,
    transaction::{core::create_transaction, form::TransactionForm},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// How long a newly minted session cookie stays valid.
    pub session_duration: Duration,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            session_duration: state.session_duration,
        }
    }
}

/// A route handler for creating a new transaction, responds with 201 Created and no body.
///
/// The body is validated before anything else happens, so an invalid request
/// neither stores a row nor mints a session. A client without a session
/// cookie is given a new session, which is set as a cookie on the response.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    jar: CookieJar,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(form) = payload.map_err(|rejection| {
        tracing::debug!("could not parse transaction body: {rejection}");
        Error::InvalidJson(rejection.body_text())
    })?;

    let new_transaction = form.validate()?;

    let (jar, session_id) = get_or_mint_session(jar, state.session_duration);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(new_transaction, &session_id, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    tracing::debug!(
        "Created transaction {} for session {session_id}",
        transaction.id
    );

    Ok((StatusCode::CREATED, jar))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use serde_json::json;

    use crate::{
        SESSION_COOKIE, endpoints,
        session::SessionId,
        test_utils::{get_test_server, get_test_state, post_transaction, session_cookie},
        transaction::{core::get_transactions, count_transactions},
    };

    #[tokio::test]
    async fn can_create_credit() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = post_transaction(&server, 500, "credit", None).await;

        response.assert_status(StatusCode::CREATED);
        assert!(response.as_bytes().is_empty(), "want empty body");
        let session_id = SessionId::new_unchecked(response.cookie(SESSION_COOKIE).value());
        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(&session_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 500);
        assert_eq!(transactions[0].description, "test transaction");
    }

    #[tokio::test]
    async fn debit_is_stored_negated() {
        let state = get_test_state();
        let server = get_test_server(state.clone());
        let cookie = session_cookie("debit-session");

        post_transaction(&server, 150, "debit", Some(&cookie))
            .await
            .assert_status(StatusCode::CREATED);

        let connection = state.db_connection.lock().unwrap();
        let transactions =
            get_transactions(&SessionId::new_unchecked("debit-session"), &connection).unwrap();
        assert_eq!(transactions[0].amount, -150);
    }

    #[tokio::test]
    async fn sets_session_cookie_when_missing() {
        let server = get_test_server(get_test_state());

        let response = post_transaction(&server, 1, "credit", None).await;

        let set_cookie_headers: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(set_cookie_headers.len(), 1, "want exactly one cookie set");
        let cookie = response.cookie(SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }

    #[tokio::test]
    async fn keeps_existing_session() {
        let server = get_test_server(get_test_state());
        let cookie = session_cookie("existing-session");

        let response = post_transaction(&server, 1, "credit", Some(&cookie)).await;

        response.assert_status(StatusCode::CREATED);
        assert!(
            response.headers().get(SET_COOKIE).is_none(),
            "want no new cookie for an existing session"
        );
    }

    #[tokio::test]
    async fn invalid_body_stores_nothing() {
        let state = get_test_state();
        let server = get_test_server(state.clone());
        let bodies = [
            json!({"amount": "ten", "description": "Salary", "type": "credit"}),
            json!({"amount": 10, "type": "credit"}),
            json!({"amount": 10, "description": "Salary", "type": "refund"}),
        ];

        for body in bodies {
            let response = server.post(endpoints::TRANSACTIONS).json(&body).await;

            response.assert_status_bad_request();
            assert!(
                response.maybe_cookie(SESSION_COOKIE).is_none(),
                "want no session minted for invalid body {body}"
            );
        }

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({"amount": "ten", "description": "Salary", "type": "refund"}))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        let fields: Vec<&str> = body["issues"]
            .as_array()
            .expect("want list of issues")
            .iter()
            .map(|issue| issue["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["amount", "type"]);
    }

    #[tokio::test]
    async fn rejects_non_json_body() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .text("amount=10&description=Salary&type=credit")
            .await;

        response.assert_status_bad_request();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }
}
