//! Reciprocal match endpoint

use axum::{extract::State, Json};
use tandem_common::{compute_matches, MatchResult};
use tracing::debug;

use crate::db;
use crate::error::ApiResult;
use crate::session::CurrentUser;
use crate::AppState;

/// GET /api/matches
///
/// Loads the caller's languages and the candidate pool, then hands both to
/// the match engine. Either load failing aborts the request; the engine never
/// runs on partial data.
pub async fn get_matches(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<MatchResult>>> {
    let requester = db::load_languages(&state.db, user.id).await?;
    let candidates = db::load_candidate_pool(&state.db, user.id).await?;

    let matches = compute_matches(user.id, &requester, &candidates);

    debug!(
        "User {}: {} matches from {} candidates",
        user.id,
        matches.len(),
        candidates.len()
    );
    Ok(Json(matches))
}
