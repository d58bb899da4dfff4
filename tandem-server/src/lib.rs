//! tandem-server library
//!
//! HTTP surface of the Tandem language-exchange service: sign-up, sessions,
//! language preferences and reciprocal matches.

use axum::{extract::DefaultBodyLimit, Router};
use sqlx::SqlitePool;
use std::time::Duration;
use tandem_common::config::DEFAULT_SESSION_TTL_SECS;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod session;

pub use error::{ApiError, ApiResult};
pub use session::CurrentUser;

/// Largest accepted request body; every payload here is a small JSON object
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, created once at startup
    pub db: SqlitePool,
    /// Secret used to sign and verify session tokens
    pub session_secret: i64,
    /// Lifetime of issued session tokens
    pub session_ttl: Duration,
}

impl AppState {
    /// Create new application state with the default session lifetime
    pub fn new(db: SqlitePool, session_secret: i64) -> Self {
        Self {
            db,
            session_secret,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    pub fn session_ttl_ms(&self) -> i64 {
        i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Build application router
///
/// Routes needing a caller identity take a `CurrentUser` extractor, so
/// public and protected routes share one router.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    // Public routes (no session required)
    let public = Router::new()
        .route("/api/languages", get(api::list_languages))
        .route("/api/signup", post(api::signup))
        .route("/api/session", post(api::login).delete(api::logout))
        .merge(api::health_routes());

    // Protected routes (CurrentUser extractor)
    let protected = Router::new()
        .route("/api/me", get(api::get_me).delete(api::delete_me))
        .route("/api/me/languages", put(api::update_languages))
        .route("/api/user-languages", post(api::update_languages))
        .route("/api/users", get(api::list_users))
        .route("/api/matches", get(api::get_matches));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
