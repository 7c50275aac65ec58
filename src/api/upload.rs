//! Form submissions with an optional file part, plus the standalone upload route

use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{post, web, HttpRequest, HttpResponse};
use anyhow::Context;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{redirect, AppError, AppState};
use crate::config::UPLOAD_FILE_FIELD;
use crate::utils::filesystem::unique_filename;

/// Largest accepted url-encoded body, and the cap on text parts of a multipart body
const FORM_TEXT_LIMIT: usize = 64 * 1024;

/// A file written to the images directory
#[derive(Debug)]
pub struct StoredUpload {
    /// Name on disk, also what the songs table records
    pub stored_name: String,
    /// Name the client sent
    pub original_name: String,
    pub content_type: Option<String>,
    pub size: u64,
    path: PathBuf,
}

impl StoredUpload {
    /// Remove the stored file, used when the submission is rejected after upload
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!("Failed to remove upload {}: {}", self.path.display(), e);
        }
    }
}

/// Text fields and at most one stored file from a form post
#[derive(Debug, Default)]
pub struct FormSubmission {
    fields: HashMap<String, String>,
    file: Option<StoredUpload>,
}

impl FormSubmission {
    /// Read a `multipart/form-data` or url-encoded body
    ///
    /// The first non-empty file part named `file_field` is written to
    /// `upload_dir` under a fresh unique name. A url-encoded body never
    /// carries a file.
    pub async fn read(
        req: &HttpRequest,
        payload: web::Payload,
        file_field: &str,
        upload_dir: &Path,
    ) -> Result<Self, AppError> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::new(req.headers(), payload);
            Self::read_multipart(multipart, file_field, upload_dir).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Self::read_urlencoded(payload).await
        } else {
            Err(AppError::BadRequest("Invalid form data."))
        }
    }

    async fn read_urlencoded(mut payload: web::Payload) -> Result<Self, AppError> {
        let mut body = web::BytesMut::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(|_| AppError::BadRequest("Invalid form data."))?;
            if body.len() + chunk.len() > FORM_TEXT_LIMIT {
                return Err(AppError::BadRequest("Form data too large."));
            }
            body.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&body);
        let pairs = web::Query::<Vec<(String, String)>>::from_query(&body)
            .map_err(|_| AppError::BadRequest("Invalid form data."))?
            .into_inner();

        let mut fields = HashMap::new();
        for (name, value) in pairs {
            fields.entry(name).or_insert(value);
        }

        Ok(Self { fields, file: None })
    }

    async fn read_multipart(
        mut payload: Multipart,
        file_field: &str,
        upload_dir: &Path,
    ) -> Result<Self, AppError> {
        let mut form = Self::default();

        if let Err(e) = form.collect_parts(&mut payload, file_field, upload_dir).await {
            if let Some(file) = form.file.take() {
                file.discard().await;
            }
            return Err(e);
        }

        Ok(form)
    }

    async fn collect_parts(
        &mut self,
        payload: &mut Multipart,
        file_field: &str,
        upload_dir: &Path,
    ) -> Result<(), AppError> {
        // text parts share one budget
        let mut text_bytes = 0usize;

        while let Some(field) = payload.next().await {
            let mut field = field.map_err(|e| {
                tracing::debug!("Rejecting malformed multipart body: {}", e);
                AppError::BadRequest("Invalid form data.")
            })?;

            let disp = field.content_disposition().clone();
            let name = disp.get_name().map(|s| s.to_string()).unwrap_or_default();
            let filename = disp.get_filename().map(|s| s.to_string());

            if name == file_field && self.file.is_none() {
                if let Some(original) = filename.clone().filter(|f| !f.is_empty()) {
                    let content_type = field.content_type().map(|ct| ct.to_string());
                    let saved = save_field(&mut field, &original, upload_dir)
                        .await
                        .map_err(AppError::upload)?;

                    if let Some((stored_name, path, size)) = saved {
                        self.file = Some(StoredUpload {
                            stored_name,
                            original_name: original,
                            content_type,
                            size,
                            path,
                        });
                    }
                    continue;
                }
            }

            if filename.is_some() {
                drain_field(&mut field).await?;
                continue;
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|_| AppError::BadRequest("Invalid form data."))?;
                text_bytes += data.len();
                if text_bytes > FORM_TEXT_LIMIT {
                    return Err(AppError::BadRequest("Form data too large."));
                }
                bytes.extend_from_slice(&data);
            }

            self.fields
                .entry(name)
                .or_insert_with(|| String::from_utf8_lossy(&bytes).into_owned());
        }

        Ok(())
    }

    /// A text field with surrounding whitespace removed; blank counts as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The stored file, if one was uploaded
    pub fn file(&self) -> Option<&StoredUpload> {
        self.file.as_ref()
    }

    /// Take ownership of the stored file
    pub fn take_file(&mut self) -> Option<StoredUpload> {
        self.file.take()
    }
}

/// Read a part to its end without keeping the bytes
async fn drain_field(field: &mut actix_multipart::Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|_| AppError::BadRequest("Invalid form data."))?;
    }
    Ok(())
}

/// Stream one file part to disk
///
/// The file is created on the first non-empty chunk, so an empty part leaves
/// nothing behind and yields `None`.
async fn save_field(
    field: &mut actix_multipart::Field,
    original: &str,
    upload_dir: &Path,
) -> anyhow::Result<Option<(String, PathBuf, u64)>> {
    let stored_name = unique_filename(original);
    let path = upload_dir.join(&stored_name);

    let mut file: Option<tokio::fs::File> = None;
    let mut size = 0u64;

    while let Some(chunk) = field.next().await {
        let data = match chunk {
            Ok(data) => data,
            Err(e) => {
                if file.is_some() {
                    let _ = tokio::fs::remove_file(&path).await;
                }
                anyhow::bail!("Upload interrupted: {}", e);
            }
        };
        if data.is_empty() {
            continue;
        }

        if file.is_none() {
            file = Some(
                tokio::fs::File::create(&path)
                    .await
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            );
        }
        if let Some(f) = file.as_mut() {
            if let Err(e) = f.write_all(&data).await {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e).with_context(|| format!("Failed to write {}", path.display()));
            }
        }
        size += data.len() as u64;
    }

    match file {
        Some(mut f) => {
            f.flush().await?;
            Ok(Some((stored_name, path, size)))
        }
        None => Ok(None),
    }
}

/// POST /upload
///
/// Stores an `audioFile` part and logs it; not linked to any song.
#[post("/upload")]
pub async fn upload_file(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form =
        FormSubmission::read(&req, payload, UPLOAD_FILE_FIELD, state.paths.images_dir()).await?;

    match form.file() {
        Some(file) => tracing::info!(
            "Uploaded: {} as {} ({} bytes, {})",
            file.original_name,
            file.stored_name,
            file.size,
            file.content_type.as_deref().unwrap_or("unknown type")
        ),
        None => tracing::info!("Uploaded: no file"),
    }

    Ok(redirect("/"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_file);
}
