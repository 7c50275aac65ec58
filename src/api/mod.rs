//! HTTP routes for songbook

pub mod auth;
mod error;
pub mod songs;
pub mod upload;

use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

pub use error::AppError;

use crate::config::{Paths, IMAGES_URL_PREFIX};
use crate::db::SongTable;
use crate::stores::UserRepository;

/// Shared state handed to every handler through `web::Data`
pub struct AppState {
    pub songs: SongTable,
    pub users: Arc<dyn UserRepository>,
    pub paths: Paths,
}

/// 302 to `location`
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// Static service for uploaded images
pub fn image_files(paths: &Paths) -> actix_files::Files {
    actix_files::Files::new(IMAGES_URL_PREFIX, paths.images_dir())
}

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    songs::configure(cfg);
    auth::configure(cfg);
    upload::configure(cfg);
}
