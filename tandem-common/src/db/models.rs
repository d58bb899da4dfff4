//! Database models

use crate::api::PasswordHash;
use crate::UserId;
use serde::Serialize;

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub password_salt: String,
}

impl UserRecord {
    pub fn password(&self) -> PasswordHash {
        PasswordHash {
            hash: self.password_hash.clone(),
            salt: self.password_salt.clone(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Public view of a user (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}
