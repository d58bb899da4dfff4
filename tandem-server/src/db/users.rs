//! User persistence and population snapshots

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tandem_common::api::PasswordHash;
use tandem_common::db::{UserRecord, UserSummary};
use tandem_common::{Error, LanguageKind, LanguageProfile, Result, UserId, UserProfile};
use tracing::info;

use super::languages::insert_tags;

/// Everything needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized e-mail
    pub email: String,
    pub display_name: String,
    pub password: PasswordHash,
    /// Normalized languages
    pub languages: LanguageProfile,
}

/// Create a user and their initial languages in one transaction
///
/// Returns `Conflict` when the e-mail is already registered.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<UserSummary> {
    let mut tx = pool.begin().await?;

    let insert = sqlx::query(
        r#"
        INSERT INTO users (email, display_name, password_hash, password_salt)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&new_user.email)
    .bind(&new_user.display_name)
    .bind(&new_user.password.hash)
    .bind(&new_user.password.salt)
    .execute(&mut *tx)
    .await;

    let id = match insert {
        Ok(result) => result.last_insert_rowid(),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(Error::Conflict(format!(
                "E-mail already registered: {}",
                new_user.email
            )));
        }
        Err(e) => return Err(e.into()),
    };

    insert_tags(&mut *tx, &new_user.languages.to_tags(id)).await?;

    tx.commit().await?;

    info!("Created user {} ({})", id, new_user.email);
    Ok(UserSummary {
        id,
        email: new_user.email.clone(),
        display_name: new_user.display_name.clone(),
    })
}

const USER_COLUMNS: &str = "id, email, display_name, password_hash, password_salt";

/// Load a user by id
pub async fn find_user_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Load a user by normalized e-mail
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Delete a user and all of their languages atomically
///
/// Returns `false` when no such user existed.
pub async fn delete_user(pool: &SqlitePool, id: UserId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_languages WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    if deleted > 0 {
        info!("Deleted user {}", id);
    }
    Ok(deleted > 0)
}

/// All users with their languages, ordered by id
pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<UserProfile>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.display_name, u.email, l.code, l.kind
        FROM users u
        LEFT JOIN user_languages l ON l.user_id = u.id
        ORDER BY u.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    collect_profiles(rows)
}

/// Every user except the requester, with their languages, ordered by id
///
/// This is the candidate pool handed to the match engine.
pub async fn load_candidate_pool(pool: &SqlitePool, requester_id: UserId) -> Result<Vec<UserProfile>> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.display_name, u.email, l.code, l.kind
        FROM users u
        LEFT JOIN user_languages l ON l.user_id = u.id
        WHERE u.id != ?
        ORDER BY u.id ASC
        "#,
    )
    .bind(requester_id)
    .fetch_all(pool)
    .await?;

    collect_profiles(rows)
}

/// Fold joined user/language rows (ordered by user id) into profiles
fn collect_profiles(rows: Vec<SqliteRow>) -> Result<Vec<UserProfile>> {
    let mut profiles: Vec<UserProfile> = Vec::new();

    for row in rows {
        let id: UserId = row.get("id");

        let is_new_user = profiles.last().map_or(true, |last| last.id != id);
        if is_new_user {
            profiles.push(UserProfile {
                id,
                display_name: row.get("display_name"),
                email: row.get("email"),
                languages: LanguageProfile::default(),
            });
        }

        let code: Option<String> = row.get("code");
        let kind: Option<String> = row.get("kind");
        if let (Some(code), Some(kind), Some(profile)) = (code, kind, profiles.last_mut()) {
            profile.languages.insert(kind.parse::<LanguageKind>()?, code);
        }
    }

    Ok(profiles)
}
