//! User directory

use axum::{extract::State, Json};
use tandem_common::UserProfile;

use crate::db;
use crate::error::ApiResult;
use crate::session::CurrentUser;
use crate::AppState;

/// GET /api/users
///
/// Every user with their languages, ordered by id.
pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let profiles = db::list_profiles(&state.db).await?;
    Ok(Json(profiles))
}
