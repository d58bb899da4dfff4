//! Session token signing and verification
//!
//! # Token format
//!
//! `"{user_id}.{issued_at_ms}.{signature}"` where `signature` is the SHA-256
//! (64 hex chars) of `"{user_id}.{issued_at_ms}"` followed by the session
//! secret as a decimal i64 string.
//!
//! The secret is a random non-zero i64 stored in the `settings` table under
//! `session_secret`, generated on first start.
//!
//! # Pure Functions
//!
//! Apart from secret loading, nothing here touches the database or HTTP.
//! The server wraps these in an axum extractor.

use crate::UserId;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Settings key holding the signing secret
pub const SESSION_SECRET_KEY: &str = "session_secret";

// ========================================
// Error Types
// ========================================

/// Reasons a session token is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Token is not `id.issued.signature`
    #[error("Malformed session token")]
    Malformed,

    /// Signature does not match
    #[error("Invalid session signature")]
    InvalidSignature,

    /// Token older than the configured lifetime
    #[error("Session expired {expired_ms}ms ago")]
    Expired { expired_ms: i64 },

    /// Token issued in the future (clock skew or forgery)
    #[error("Session issued in the future")]
    IssuedInFuture,

    /// Database error loading the secret
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ========================================
// Secret Management
// ========================================

/// Load the session secret, generating and storing one if missing
#[cfg(feature = "sqlx")]
pub async fn load_session_secret(db: &SqlitePool) -> Result<i64, SessionError> {
    let result: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(SESSION_SECRET_KEY)
        .fetch_optional(db)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .ok()
            .filter(|secret| *secret != 0)
            .ok_or_else(|| SessionError::DatabaseError(format!("Invalid session secret: {:?}", value))),
        None => initialize_session_secret(db).await,
    }
}

/// Generate a random non-zero secret and store it
#[cfg(feature = "sqlx")]
pub async fn initialize_session_secret(db: &SqlitePool) -> Result<i64, SessionError> {
    use rand::Rng;

    let secret: i64 = {
        let mut rng = rand::thread_rng();
        loop {
            let val = rng.gen::<i64>();
            if val != 0 {
                break val;
            }
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SESSION_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Signing
// ========================================

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// SHA-256 signature over a token payload
pub fn sign(payload: &str, secret: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a token for `user_id` stamped with the current time
pub fn issue_token(user_id: UserId, secret: i64) -> String {
    issue_token_at(user_id, now_millis(), secret)
}

/// Issue a token with an explicit issue time
///
/// # Examples
///
/// ```
/// use tandem_common::api::auth::{issue_token_at, verify_token_at};
///
/// let token = issue_token_at(42, 1_000, 99);
/// assert_eq!(verify_token_at(&token, 99, 60_000, 2_000), Ok(42));
/// assert!(verify_token_at(&token, 98, 60_000, 2_000).is_err());
/// ```
pub fn issue_token_at(user_id: UserId, issued_at_ms: i64, secret: i64) -> String {
    let payload = format!("{}.{}", user_id, issued_at_ms);
    let signature = sign(&payload, secret);
    format!("{}.{}", payload, signature)
}

// ========================================
// Verification
// ========================================

/// Verify a token against the current time
pub fn verify_token(token: &str, secret: i64, ttl_ms: i64) -> Result<UserId, SessionError> {
    verify_token_at(token, secret, ttl_ms, now_millis())
}

/// Verify a token and return the user id it was issued for
///
/// Allows 1 second of clock skew for tokens stamped slightly ahead.
pub fn verify_token_at(
    token: &str,
    secret: i64,
    ttl_ms: i64,
    now_ms: i64,
) -> Result<UserId, SessionError> {
    let mut parts = token.trim().splitn(3, '.');
    let (Some(id_part), Some(issued_part), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionError::Malformed);
    };

    let user_id: UserId = id_part.parse().map_err(|_| SessionError::Malformed)?;
    let issued_at_ms: i64 = issued_part.parse().map_err(|_| SessionError::Malformed)?;

    let expected = sign(&format!("{}.{}", user_id, issued_at_ms), secret);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return Err(SessionError::InvalidSignature);
    }

    if issued_at_ms - now_ms > 1000 {
        return Err(SessionError::IssuedInFuture);
    }

    let age_ms = now_ms - issued_at_ms;
    if age_ms > ttl_ms {
        return Err(SessionError::Expired {
            expired_ms: age_ms - ttl_ms,
        });
    }

    Ok(user_id)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
