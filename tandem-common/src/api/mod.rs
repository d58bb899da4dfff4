//! Shared authentication primitives
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Secret storage (via sqlx)
//!
//! The server wraps these with axum extractors.

pub mod auth;
pub mod password;

pub use auth::{issue_token, issue_token_at, now_millis, verify_token, verify_token_at, SessionError};
#[cfg(feature = "sqlx")]
pub use auth::load_session_secret;
pub use password::PasswordHash;
