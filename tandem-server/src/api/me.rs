//! The caller's own account and language preferences

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    Json,
};
use serde::{Deserialize, Serialize};
use tandem_common::{LanguageProfile, LanguageSet};
use tracing::info;

use super::OkResponse;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::session::{clear_session_cookie, CurrentUser};
use crate::AppState;

/// GET /api/me response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub display_name: String,
    pub natives: LanguageSet,
    pub targets: LanguageSet,
}

/// PUT /api/me/languages request body
#[derive(Debug, Deserialize)]
pub struct LanguagesRequest {
    #[serde(default)]
    pub natives: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// GET /api/me
pub async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<MeResponse>> {
    let languages = db::load_languages(&state.db, user.id).await?;

    Ok(Json(MeResponse {
        email: user.email,
        display_name: user.display_name,
        natives: languages.natives,
        targets: languages.targets,
    }))
}

/// DELETE /api/me
///
/// Removes the account and its languages, then clears the session cookie.
pub async fn delete_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<([(header::HeaderName, String); 1], Json<OkResponse>)> {
    if !db::delete_user(&state.db, user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!("Account deleted: user {} ({})", user.id, user.email);
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(OkResponse::ok()),
    ))
}

/// PUT /api/me/languages (also POST /api/user-languages)
///
/// Replaces the caller's languages wholesale. Lists are normalized first;
/// omitted lists count as empty.
pub async fn update_languages(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<LanguagesRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(request) = payload?;

    let profile = LanguageProfile::from_raw(&request.natives, &request.targets);
    profile.validate()?;

    db::replace_languages(&state.db, user.id, &profile).await?;

    info!(
        "Languages updated for user {}: {} native, {} target",
        user.id,
        profile.natives.len(),
        profile.targets.len()
    );
    Ok(Json(OkResponse::ok()))
}
