//! Login and logout
//!
//! Login issues a signed token, returned in the body for bearer use and as
//! the `tandem_session` cookie for browsers. Logout only clears the cookie;
//! tokens are stateless and expire on their own.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    Json,
};
use serde::{Deserialize, Serialize};
use tandem_common::api::issue_token;
use tandem_common::db::UserSummary;
use tandem_common::languages::normalize_email;
use tracing::info;

use super::OkResponse;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::session::{clear_session_cookie, session_cookie};
use crate::AppState;

/// POST /api/session request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// POST /api/session
///
/// Unknown e-mail and wrong password both answer 401 without saying which.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<([(header::HeaderName, String); 1], Json<LoginResponse>)> {
    let Json(request) = payload?;

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".to_string()));
    }

    let user = db::find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated(format!("unknown e-mail {}", email)))?;

    if !user.password().verify(request.password.as_deref()) {
        return Err(ApiError::Unauthenticated(format!(
            "wrong password for user {}",
            user.id
        )));
    }

    let token = issue_token(user.id, state.session_secret);
    let cookie = session_cookie(&token, state.session_ttl.as_secs());

    info!("Login: user {}", user.id);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token,
            user: user.summary(),
        }),
    ))
}

/// DELETE /api/session
pub async fn logout() -> ([(header::HeaderName, String); 1], Json<OkResponse>) {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(OkResponse::ok()),
    )
}
