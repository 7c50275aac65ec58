//! HTTP error mapping
//!
//! Every failure leaves the server as a plain-text response. Store and
//! filesystem errors are logged here and reach the client only as a short
//! per-route message.

use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A store query failed; `message` is what the client sees
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
    /// Storing an uploaded file failed
    #[error("Error saving upload")]
    Upload(#[source] anyhow::Error),
    #[error("Song not found")]
    SongNotFound,
    /// Client input rejected, message is returned verbatim
    #[error("{0}")]
    BadRequest(&'static str),
}

impl AppError {
    /// Map a store error to a 500 with `message`, logging the cause
    pub fn store(message: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
        move |source| {
            tracing::error!("{}: {:#}", message, source);
            AppError::Store { message, source }
        }
    }

    /// Map an upload I/O error to a 500, logging the cause
    pub fn upload(source: anyhow::Error) -> AppError {
        tracing::error!("Error saving upload: {:#}", source);
        AppError::Upload(source)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store { .. } | AppError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SongNotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}
