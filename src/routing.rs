//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    session::session_guard,
    transaction::{
        create_transaction_endpoint, get_summary_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Creating a transaction is open to everyone and mints a session if needed.
/// Reading requires a session cookie, which is checked by [session_guard]
/// before the route handler runs.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes: Router<AppState> =
        Router::new().route(endpoints::TRANSACTIONS, post(create_transaction_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .route_layer(middleware::from_fn(session_guard));

    protected_routes
        .merge(unprotected_routes)
        .with_state(state)
}
