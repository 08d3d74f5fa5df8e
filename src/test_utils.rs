#![allow(missing_docs)]

use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, SESSION_COOKIE, build_router, db::initialize, endpoints};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

pub(crate) fn get_test_state() -> AppState {
    AppState::new(Connection::open_in_memory().unwrap()).expect("Could not create app state")
}

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state))
}

/// Post a valid transaction, attaching `session` as the session cookie if given.
pub(crate) async fn post_transaction(
    server: &TestServer,
    amount: i64,
    type_: &str,
    session: Option<&Cookie<'static>>,
) -> TestResponse {
    let mut request = server.post(endpoints::TRANSACTIONS).json(&json!({
        "amount": amount,
        "description": "test transaction",
        "type": type_,
    }));

    if let Some(cookie) = session {
        request = request.add_cookie(cookie.clone());
    }

    request.await
}

pub(crate) fn session_cookie(value: &str) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, value.to_owned())
}
