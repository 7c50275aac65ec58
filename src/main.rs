//! songbook - a small server-rendered catalog for song records
//!
//! Songs are listed, created, edited and deleted through HTML forms, with an
//! optional cover image per song. Accounts can register and log in, but
//! there are no sessions.

mod api;
mod config;
mod db;
mod models;
mod stores;
mod utils;
mod views;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{Paths, Settings, UserStoreKind};
use crate::db::{DbEngine, SongTable, UserTable};
use crate::stores::{seed_demo_users, MemoryUserStore, UserRepository};

/// songbook - song catalog server
#[derive(Parser, Debug)]
#[command(name = "songbook")]
#[command(version)]
#[command(about = "A small server-rendered catalog for song records")]
struct Args {
    /// Host address to bind to (overrides settings)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides settings and PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug when set
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("songbook v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    start_songbook(settings).await
}

async fn start_songbook(settings: Settings) -> Result<()> {
    let paths = Paths::init(&settings.public_dir)?;
    info!("Public directory: {:?}", paths.public_dir());

    info!("Connecting to database...");
    let engine = DbEngine::connect(&settings.database_url).await?;
    let songs = SongTable::new(&engine);
    info!("Catalog has {} songs", songs.count().await?);

    let users: Arc<dyn UserRepository> = match settings.auth.store {
        UserStoreKind::Database => Arc::new(UserTable::new(&engine)),
        UserStoreKind::Memory => {
            info!("Using in-memory user store; accounts are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    if settings.auth.seed_demo_users {
        let inserted = seed_demo_users(users.as_ref()).await?;
        if inserted > 0 {
            info!("Seeded {} demo users", inserted);
        }
    }

    let state = actix_web::web::Data::new(api::AppState {
        songs,
        users,
        paths: paths.clone(),
    });

    let addr = settings.bind_addr();
    info!("Server listening on http://{}", addr);

    use actix_web::{middleware, App, HttpServer};

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .service(api::image_files(&paths))
            .configure(api::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    engine.pool().close().await;
    info!("Server stopped");

    Ok(())
}
