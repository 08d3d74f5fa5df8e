//! Anonymous client sessions carried in a cookie.
//!
//! A session is not stored anywhere. It is an opaque identifier that is
//! minted the first time a client writes a transaction and is then echoed
//! back by the client's cookie. The only check made on it is that it is
//! present.

use std::fmt::Display;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::Error;

/// The name of the cookie holding the session ID.
pub const SESSION_COOKIE: &str = "sessionId";
/// The default duration for which a new session cookie is valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);

/// The opaque identifier of an anonymous client session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new, random session ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing session ID, e.g. one read from a cookie or the database.
    pub fn new_unchecked(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The session ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Get the session ID from the cookie jar, if there is one.
///
/// A cookie with an empty value is treated as missing.
pub fn get_session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(SessionId::new_unchecked)
}

/// Add the session cookie to the cookie jar.
///
/// The cookie applies to the whole service and the client keeps it for
/// `duration`.
///
/// Returns the cookie jar with the cookie added.
pub fn set_session_cookie(jar: CookieJar, session_id: &SessionId, duration: Duration) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .path("/")
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Get the session ID from the cookie jar, minting a new one if there is none.
///
/// When a session is minted, the returned jar contains the cookie that must
/// be sent back to the client. An existing session is passed through
/// unchanged and the jar is returned as is.
pub fn get_or_mint_session(jar: CookieJar, duration: Duration) -> (CookieJar, SessionId) {
    if let Some(session_id) = get_session_id(&jar) {
        return (jar, session_id);
    }

    let session_id = SessionId::new_random();
    tracing::debug!("Minted new session {session_id}");

    (set_session_cookie(jar, &session_id, duration), session_id)
}

/// Middleware function that checks for a session cookie.
///
/// The session ID is placed into the request and then the request executed
/// normally if the cookie is present, otherwise a 401 response is returned
/// without running the handler.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session_id): Extension<SessionId>` to receive the session ID.
pub async fn session_guard(mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());

    let Some(session_id) = get_session_id(&jar) else {
        tracing::debug!(
            "Rejected request to {} without a session cookie",
            request.uri().path()
        );
        return Error::SessionMissing.into_response();
    };

    request.extensions_mut().insert(session_id);

    next.run(request).await
}
