use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::db::SessionId;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "movie_session";

/// Finds a valid session id in the request's `Cookie` headers
pub fn session_from_cookies(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

/// `Set-Cookie` value for a freshly issued session
pub fn session_cookie(session_id: SessionId) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    )
}

/// Middleware that attaches a [`SessionId`] to every request.
///
/// Reuses the id from the session cookie when present and well-formed;
/// otherwise issues a new one and sets the cookie on the response.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let existing = session_from_cookies(request.headers());
    let session_id = existing.unwrap_or_default();

    request.extensions_mut().insert(session_id);

    let mut response = next.run(request).await;

    if existing.is_none() {
        tracing::debug!(session_id = %session_id, "New session issued");
        if let Ok(value) = HeaderValue::from_str(&session_cookie(session_id)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
