//! # Tandem Common Library
//!
//! Shared code for the Tandem language-exchange service:
//! - Language codes, normalization and per-user profiles
//! - The reciprocal match engine
//! - Session token signing and password hashing
//! - Database schema and models
//! - Configuration loading

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod languages;
pub mod matching;

pub use error::{Error, Result};
pub use languages::{normalize_codes, LanguageKind, LanguageProfile, LanguageSet, LanguageTag};
pub use matching::{compute_matches, LanguagePair, MatchResult, UserProfile};

/// Stable user identifier (`users.id`)
pub type UserId = i64;
