//! Database engine and connection management

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Database engine wrapper, cheap to clone
#[derive(Debug, Clone)]
pub struct DbEngine {
    pool: SqlitePool,
}

impl DbEngine {
    /// Connect to the store and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30))
            .pragma("foreign_keys", "ON");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30));

        // every connection to an in-memory database is a separate database,
        // and the data is gone once that connection closes
        if database_url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let engine = Self { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all database tables
    async fn create_tables(&self) -> Result<()> {
        // Songs table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS songs (
                songId INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                artist TEXT NOT NULL,
                image TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create songs table")?;

        // Users table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                password TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create users table")?;

        Ok(())
    }
}
