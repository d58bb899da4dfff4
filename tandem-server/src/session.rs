//! Session resolution
//!
//! Handlers that need a caller take a [`CurrentUser`] argument. The extractor
//! runs before the handler body:
//!
//! 1. Read the token from `Authorization: Bearer <token>` or the
//!    `tandem_session` cookie
//! 2. Verify signature and age against the session secret
//! 3. Load the user record once; handlers reuse it from `CurrentUser`
//!
//! Missing or invalid tokens are rejected with 401 before any data access;
//! a valid token for a deleted account is rejected with 404.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tandem_common::api::verify_token;
use tandem_common::UserId;
use tracing::debug;

use crate::db;
use crate::error::ApiError;
use crate::AppState;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "tandem_session";

/// The authenticated caller, resolved once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthenticated("missing session token".to_string()))?;

        let user_id = verify_token(&token, state.session_secret, state.session_ttl_ms())
            .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

        let user = db::find_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        debug!("Resolved session for user {}", user.id);
        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        })
    }
}

/// Find the session token in the request headers
///
/// A bearer token takes precedence over the cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value removing the session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
