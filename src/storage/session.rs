// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Durable session storage
//!
//! The identity survives restarts as two records in `ClientState`:
//! `token` (opaque string) and `user` (JSON-serialized [`User`]).

use crate::api::models::User;
use crate::error::{LibraryError, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

async fn put(tx: &mut Transaction<'_, Sqlite>, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ClientState (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Read one raw record
pub async fn get_value(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM ClientState WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Persist token and user together
pub async fn save_session(pool: &SqlitePool, token: &str, user: &User) -> Result<()> {
    let user_json = serde_json::to_string(user)?;

    let mut tx = pool.begin().await?;
    put(&mut tx, TOKEN_KEY, token).await?;
    put(&mut tx, USER_KEY, &user_json).await?;
    tx.commit().await?;

    Ok(())
}

/// Replace or remove the stored user, leaving the token alone
pub async fn save_user(pool: &SqlitePool, user: Option<&User>) -> Result<()> {
    let mut tx = pool.begin().await?;
    match user {
        Some(user) => put(&mut tx, USER_KEY, &serde_json::to_string(user)?).await?,
        None => {
            sqlx::query("DELETE FROM ClientState WHERE key = ?")
                .bind(USER_KEY)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    Ok(())
}

pub async fn load_token(pool: &SqlitePool) -> Result<Option<String>> {
    get_value(pool, TOKEN_KEY).await
}

/// Load the stored user
///
/// # Errors
/// Returns [`LibraryError::CorruptRecord`] if the record is not a valid user
pub async fn load_user(pool: &SqlitePool) -> Result<Option<User>> {
    let Some(raw) = get_value(pool, USER_KEY).await? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| LibraryError::CorruptRecord {
            key: USER_KEY.to_string(),
            reason: e.to_string(),
        })
}

/// Remove both identity records
pub async fn clear_session(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM ClientState WHERE key IN (?, ?)")
        .bind(TOKEN_KEY)
        .bind(USER_KEY)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Role;
    use crate::storage::database::Database;

    fn reader() -> User {
        User {
            id: "1".to_string(),
            name: "Jan Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            library_card_id: "123".to_string(),
            role: Role::Client,
        }
    }

    #[tokio::test]
    async fn test_save_and_load_session() {
        let db = Database::new_in_memory().await.unwrap();

        save_session(db.pool(), "tok", &reader()).await.unwrap();

        assert_eq!(load_token(db.pool()).await.unwrap().as_deref(), Some("tok"));
        assert_eq!(load_user(db.pool()).await.unwrap(), Some(reader()));
    }

    #[tokio::test]
    async fn test_save_session_overwrites() {
        let db = Database::new_in_memory().await.unwrap();

        save_session(db.pool(), "old", &reader()).await.unwrap();
        save_session(db.pool(), "new", &reader()).await.unwrap();

        assert_eq!(load_token(db.pool()).await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_clear_session_is_idempotent() {
        let db = Database::new_in_memory().await.unwrap();
        save_session(db.pool(), "tok", &reader()).await.unwrap();

        clear_session(db.pool()).await.unwrap();
        clear_session(db.pool()).await.unwrap();

        assert_eq!(load_token(db.pool()).await.unwrap(), None);
        assert_eq!(load_user(db.pool()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_user_none_keeps_token() {
        let db = Database::new_in_memory().await.unwrap();
        save_session(db.pool(), "tok", &reader()).await.unwrap();

        save_user(db.pool(), None).await.unwrap();

        assert_eq!(load_user(db.pool()).await.unwrap(), None);
        assert_eq!(load_token(db.pool()).await.unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_corrupt_user_record() {
        let db = Database::new_in_memory().await.unwrap();
        sqlx::query("INSERT INTO ClientState (key, value) VALUES ('user', '{not json')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = load_user(db.pool()).await.unwrap_err();
        assert!(matches!(err, LibraryError::CorruptRecord { .. }));
    }
}
