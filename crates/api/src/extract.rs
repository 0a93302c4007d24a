use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use lobianco_core::auth::SESSION_COOKIE;
use lobianco_core::Caller;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind a request, resolved from a bearer token or the session
/// cookie. Requests without a valid session get an anonymous caller; the
/// procedure layer decides what they may do.
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller);

impl FromRequestParts<AppState> for CurrentCaller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers);
        let caller = state.service().resolve_session(token.as_deref()).await;
        Ok(CurrentCaller(caller))
    }
}

/// A caller that holds the admin role. Resolved before the body is read, so
/// an anonymous request gets 401 even when its body would not parse.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers);
        let caller = state.service().resolve_session(token.as_deref()).await;
        caller.require_admin()?;
        Ok(AdminCaller(caller))
    }
}

/// Bearer header first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
