//! User table operations

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::db::DbEngine;
use crate::models::{NewUser, User};
use crate::stores::{UserRepository, UserStoreError};

/// Database row for users table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
        }
    }
}

/// User table operations
#[derive(Debug, Clone)]
pub struct UserTable {
    pool: SqlitePool,
}

impl UserTable {
    pub fn new(engine: &DbEngine) -> Self {
        Self {
            pool: engine.pool().clone(),
        }
    }

    /// Get user count
    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }
}

#[async_trait]
impl UserRepository for UserTable {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| r.into_user()))
    }

    async fn insert(&self, user: NewUser) -> Result<i64, UserStoreError> {
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(UserStoreError::UsernameTaken(user.username))
            }
            Err(e) => Err(UserStoreError::Backend(e.into())),
        }
    }
}
