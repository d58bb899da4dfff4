//! Language tag persistence
//!
//! A user's tags are only ever replaced wholesale: delete everything, insert
//! the new set, inside one transaction. Readers see either the old set or the
//! new one, never an empty set in between.

use sqlx::{Row, SqliteConnection, SqlitePool};
use tandem_common::{Error, LanguageKind, LanguageProfile, LanguageTag, Result, UserId};
use tracing::debug;

/// Load one user's languages
pub async fn load_languages(pool: &SqlitePool, user_id: UserId) -> Result<LanguageProfile> {
    let rows = sqlx::query("SELECT code, kind FROM user_languages WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let mut profile = LanguageProfile::default();
    for row in rows {
        let kind: String = row.get("kind");
        profile.insert(kind.parse::<LanguageKind>()?, row.get("code"));
    }

    Ok(profile)
}

/// Atomically replace a user's full tag set
///
/// Returns `NotFound` when the user no longer exists.
pub async fn replace_languages(
    pool: &SqlitePool,
    user_id: UserId,
    profile: &LanguageProfile,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    // First statement must write: a read-first transaction cannot upgrade
    // its lock under WAL and fails with SQLITE_BUSY instead of waiting.
    let touched = sqlx::query("UPDATE users SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 0 {
        return Err(Error::NotFound("User not found".to_string()));
    }

    sqlx::query("DELETE FROM user_languages WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    insert_tags(&mut *tx, &profile.to_tags(user_id)).await?;

    tx.commit().await?;

    debug!(
        "Replaced languages for user {}: natives={:?} targets={:?}",
        user_id, profile.natives, profile.targets
    );
    Ok(())
}

/// Insert tags on an open connection (normally inside a transaction)
pub(crate) async fn insert_tags(conn: &mut SqliteConnection, tags: &[LanguageTag]) -> Result<()> {
    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO user_languages (user_id, code, kind) VALUES (?, ?, ?)")
            .bind(tag.user_id)
            .bind(&tag.code)
            .bind(tag.kind.as_str())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::{create_user, NewUser};
    use tandem_common::api::PasswordHash;
    use tandem_common::db::{init_database, open_in_memory};

    async fn user_with(pool: &SqlitePool, email: &str, natives: &[&str], targets: &[&str]) -> UserId {
        create_user(
            pool,
            &NewUser {
                email: email.to_string(),
                display_name: email.to_string(),
                password: PasswordHash::none(),
                languages: LanguageProfile::from_raw(natives, targets),
            },
        )
        .await
        .expect("Failed to create user")
        .id
    }

    #[tokio::test]
    async fn test_load_languages_partitions_kinds() {
        let pool = open_in_memory().await.unwrap();
        let id = user_with(&pool, "a@example.com", &["en", "fr"], &["zh"]).await;

        let profile = load_languages(&pool, id).await.unwrap();
        assert_eq!(profile, LanguageProfile::from_raw(["en", "fr"], ["zh"]));
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let pool = open_in_memory().await.unwrap();
        let id = user_with(&pool, "a@example.com", &["en", "fr"], &["zh", "ja"]).await;

        let replacement = LanguageProfile::from_raw(["de"], ["ko"]);
        replace_languages(&pool, id, &replacement).await.unwrap();

        assert_eq!(load_languages(&pool, id).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_replace_with_empty_clears_tags() {
        let pool = open_in_memory().await.unwrap();
        let id = user_with(&pool, "a@example.com", &["en"], &["zh"]).await;

        replace_languages(&pool, id, &LanguageProfile::default()).await.unwrap();

        assert!(load_languages(&pool, id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_leaves_other_users_alone() {
        let pool = open_in_memory().await.unwrap();
        let a = user_with(&pool, "a@example.com", &["en"], &["zh"]).await;
        let b = user_with(&pool, "b@example.com", &["zh"], &["en"]).await;

        replace_languages(&pool, a, &LanguageProfile::from_raw(["fr"], ["de"]))
            .await
            .unwrap();

        assert_eq!(
            load_languages(&pool, b).await.unwrap(),
            LanguageProfile::from_raw(["zh"], ["en"])
        );
    }

    #[tokio::test]
    async fn test_replace_unknown_user_is_not_found() {
        let pool = open_in_memory().await.unwrap();

        let err = replace_languages(&pool, 999, &LanguageProfile::from_raw(["en"], ["zh"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_replaces_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("tandem.db")).await.unwrap();

        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(user_with(&pool, &format!("user{}@example.com", i), &["en"], &["zh"]).await);
        }

        let choices = vec![
            LanguageProfile::from_raw(["en"], ["zh"]),
            LanguageProfile::from_raw(["zh", "ja"], ["en"]),
            LanguageProfile::from_raw(["fr"], ["de", "ko"]),
        ];

        let mut handles = Vec::new();
        for round in 0..20 {
            for (n, &id) in ids.iter().enumerate() {
                let pool = pool.clone();
                let profile = choices[(round + n) % choices.len()].clone();
                handles.push(tokio::spawn(async move {
                    replace_languages(&pool, id, &profile).await
                }));
            }
        }

        for handle in handles {
            handle
                .await
                .expect("Replace task panicked")
                .expect("Concurrent replace failed");
        }

        // Every user ends on exactly one of the sets written, never a mix
        for id in ids {
            let profile = load_languages(&pool, id).await.unwrap();
            assert!(choices.contains(&profile), "unexpected set {:?}", profile);
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn test_load_languages_for_unknown_user_is_empty() {
        let pool = open_in_memory().await.unwrap();
        assert!(load_languages(&pool, 42).await.unwrap().is_empty());
    }
}
