//! Server settings
//!
//! Precedence, lowest first: built-in defaults, the optional settings file,
//! `SONGBOOK_*` environment variables, then the plain `PORT` variable.
//! CLI flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment prefix for settings overrides (`SONGBOOK_PORT`, `SONGBOOK_AUTH__STORE`)
const ENV_PREFIX: &str = "SONGBOOK";

/// Default settings file, read only when present
pub const DEFAULT_SETTINGS_FILE: &str = "songbook.toml";

/// Where user accounts are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStoreKind {
    /// `users` table next to the songs
    Database,
    /// process-lifetime store, lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Backing store for registered users
    pub store: UserStoreKind,
    /// Insert the demo accounts (`user1`, `user2`) when missing
    pub seed_demo_users: bool,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// sqlx connection string for the song store
    pub database_url: String,
    /// Directory holding publicly served files; uploads go to `<public_dir>/images`
    pub public_dir: PathBuf,
    pub auth: AuthSettings,
}

impl Settings {
    /// Load settings, optionally from an explicit file
    ///
    /// A missing default file is fine. A missing explicit file is an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let (path, required) = match file {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };

        let builder = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("database_url", "sqlite:songbook.db")?
            .set_default("public_dir", "public")?
            .set_default("auth.store", "database")?
            .set_default("auth.seed_demo_users", false)?
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("port", std::env::var("PORT").ok())?;

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Failed to load settings from {}", path.display()))
    }

    /// `host:port` pair for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
