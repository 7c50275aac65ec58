//! Song catalog routes

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use std::path::Path;

use super::upload::{FormSubmission, StoredUpload};
use super::{redirect, AppError, AppState};
use crate::config::SONG_IMAGE_FIELD;
use crate::models::NewSong;
use crate::utils::dates::parse_form_date;
use crate::utils::filesystem::sanitize_filename;
use crate::views::{self, render};

/// Field values of a song form, image excluded
fn song_from_form(form: &FormSubmission, image: Option<String>) -> Result<NewSong, AppError> {
    let (Some(name), Some(date), Some(artist)) =
        (form.text("name"), form.text("date"), form.text("artist"))
    else {
        return Err(AppError::BadRequest("All fields are required."));
    };

    let date = parse_form_date(date).ok_or(AppError::BadRequest("Invalid date."))?;

    Ok(NewSong {
        name: name.to_string(),
        date,
        artist: artist.to_string(),
        image,
    })
}

/// The `currentImage` hidden field, only if it names a stored image
async fn current_image(
    form: &FormSubmission,
    images_dir: &Path,
) -> Result<Option<String>, AppError> {
    const INVALID: &str = "Invalid image reference.";

    let Some(name) = form.text("currentImage") else {
        return Ok(None);
    };
    if sanitize_filename(name) != name {
        return Err(AppError::BadRequest(INVALID));
    }

    match tokio::fs::try_exists(images_dir.join(name)).await {
        Ok(true) => Ok(Some(name.to_string())),
        Ok(false) => Err(AppError::BadRequest(INVALID)),
        Err(e) => {
            tracing::warn!("Cannot check image {}: {}", name, e);
            Err(AppError::BadRequest(INVALID))
        }
    }
}

/// Drop an upload that will not be referenced by any row
async fn discard(upload: Option<StoredUpload>) {
    if let Some(file) = upload {
        file.discard().await;
    }
}

/// GET /
#[get("/")]
pub async fn list_songs(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let songs = state
        .songs
        .all()
        .await
        .map_err(AppError::store("Error retrieving songs"))?;

    Ok(render(views::songs::index(&songs)))
}

/// GET /song/{id}
#[get("/song/{id}")]
pub async fn get_song(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let song = state
        .songs
        .get_by_id(path.into_inner())
        .await
        .map_err(AppError::store("Error retrieving song by ID"))?
        .ok_or(AppError::SongNotFound)?;

    Ok(render(views::songs::detail(&song)))
}

/// GET /song
#[get("/song")]
pub async fn new_song_form() -> HttpResponse {
    render(views::songs::add_form())
}

/// POST /addSong
#[post("/addSong")]
pub async fn add_song(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut form =
        FormSubmission::read(&req, payload, SONG_IMAGE_FIELD, state.paths.images_dir()).await?;
    let upload = form.take_file();

    let song = match song_from_form(&form, upload.as_ref().map(|f| f.stored_name.clone())) {
        Ok(song) => song,
        Err(e) => {
            discard(upload).await;
            return Err(e);
        }
    };

    match state.songs.insert(&song).await {
        Ok(id) => {
            tracing::info!("Added song {} ({})", id, song.name);
            Ok(redirect("/"))
        }
        Err(e) => {
            discard(upload).await;
            Err(AppError::store("Error adding song")(e))
        }
    }
}

/// GET /editSong/{id}
#[get("/editSong/{id}")]
pub async fn edit_song_form(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let song = state
        .songs
        .get_raw_by_id(path.into_inner())
        .await
        .map_err(AppError::store("Error retrieving song by ID"))?
        .ok_or(AppError::SongNotFound)?;

    Ok(render(views::songs::edit_form(&song)))
}

/// POST /editSong/{id}
///
/// Without a new file the image named by `currentImage` is kept.
#[post("/editSong/{id}")]
pub async fn edit_song(
    path: web::Path<i64>,
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let song_id = path.into_inner();
    let mut form =
        FormSubmission::read(&req, payload, SONG_IMAGE_FIELD, state.paths.images_dir()).await?;
    let upload = form.take_file();

    let image = match &upload {
        Some(file) => Ok(Some(file.stored_name.clone())),
        None => current_image(&form, state.paths.images_dir()).await,
    };
    let song = match image.and_then(|image| song_from_form(&form, image)) {
        Ok(song) => song,
        Err(e) => {
            discard(upload).await;
            return Err(e);
        }
    };

    match state.songs.update(song_id, &song).await {
        Ok(updated) => {
            if updated {
                tracing::info!("Updated song {}", song_id);
            } else {
                tracing::debug!("Update for missing song {}", song_id);
                discard(upload).await;
            }
            Ok(redirect("/"))
        }
        Err(e) => {
            discard(upload).await;
            Err(AppError::store("Error updating song")(e))
        }
    }
}

/// GET /deleteSong/{id}
#[get("/deleteSong/{id}")]
pub async fn delete_song(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let song_id = path.into_inner();
    let deleted = state
        .songs
        .delete(song_id)
        .await
        .map_err(AppError::store("Error deleting song"))?;

    if deleted {
        tracing::info!("Deleted song {}", song_id);
    }

    Ok(redirect("/"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_songs)
        .service(get_song)
        .service(new_song_form)
        .service(add_song)
        .service(edit_song_form)
        .service(edit_song)
        .service(delete_song);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};

    use crate::api::test_support::{
        body_string, init_app, location, multipart_post, state, Part, BOUNDARY,
    };

    fn song_parts<'a>(name: &'a str, date: &'a str, artist: &'a str) -> Vec<Part<'a>> {
        vec![
            ("name", None, name.as_bytes()),
            ("date", None, date.as_bytes()),
            ("artist", None, artist.as_bytes()),
        ]
    }

    fn stored_images(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[actix_web::test]
    async fn test_add_song_without_file_then_list() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-01-01", "X")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/"));

        let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert!(body.contains("Ode"));
        assert!(body.contains("<td>X</td>"));
        assert!(body.contains("January 01, 2024"));
        assert!(body.contains("No image"));

        let all = songs.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].song.artist, "X");
        assert_eq!(all[0].song.image, None);
    }

    #[actix_web::test]
    async fn test_add_song_urlencoded() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let req = TestRequest::post()
            .uri("/addSong")
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("name=Ode+to+Joy&date=2024-01-01&artist=X")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let all = songs.all().await.unwrap();
        assert_eq!(all[0].song.name, "Ode to Joy");
    }

    #[actix_web::test]
    async fn test_add_song_with_image_is_served() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let images_dir = state.paths.images_dir().to_path_buf();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some("cover.png"), &b"not really a png"[..]));
        let resp = test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let song = songs.all().await.unwrap().remove(0).song;
        let image = song.image.unwrap();
        assert!(image.ends_with("-cover.png"));
        assert_eq!(stored_images(&images_dir), vec![image.clone()]);

        let resp = test::call_service(
            &app,
            TestRequest::get().uri(&format!("/images/{}", image)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "not really a png");
    }

    #[actix_web::test]
    async fn test_same_filename_does_not_overwrite() {
        let (state, _dir) = state().await;
        let images_dir = state.paths.images_dir().to_path_buf();
        let app = init_app!(state);

        for content in [&b"first"[..], &b"second"[..]] {
            let mut parts = song_parts("Ode", "2024-01-01", "X");
            parts.push(("image", Some("cover.png"), content));
            let resp =
                test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
        }

        assert_eq!(stored_images(&images_dir).len(), 2);
    }

    #[actix_web::test]
    async fn test_empty_file_part_means_no_image() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let images_dir = state.paths.images_dir().to_path_buf();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some(""), &b""[..]));
        let resp = test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        assert_eq!(songs.all().await.unwrap()[0].song.image, None);
        assert!(stored_images(&images_dir).is_empty());
    }

    #[actix_web::test]
    async fn test_add_song_missing_field_is_rejected() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let images_dir = state.paths.images_dir().to_path_buf();
        let app = init_app!(state);

        let parts = vec![
            ("name", None, &b"Ode"[..]),
            ("date", None, &b"2024-01-01"[..]),
            ("artist", None, &b"   "[..]),
            ("image", Some("cover.png"), &b"bytes"[..]),
        ];
        let resp = test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "All fields are required.");

        assert_eq!(songs.count().await.unwrap(), 0);
        assert!(stored_images(&images_dir).is_empty());
    }

    #[actix_web::test]
    async fn test_add_song_invalid_date() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "yesterday", "X")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Invalid date.");
    }

    #[actix_web::test]
    async fn test_add_song_rejects_other_content_types() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let req = TestRequest::post()
            .uri("/addSong")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"name":"Ode"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_song_detail_and_not_found() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-03-09", "X")).to_request();
        test::call_service(&app, req).await;

        let resp = test::call_service(&app, TestRequest::get().uri("/song/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("March 09, 2024"));

        let resp = test::call_service(&app, TestRequest::get().uri("/song/99").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "Song not found");

        let resp = test::call_service(&app, TestRequest::get().uri("/song/abc").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp =
            test::call_service(&app, TestRequest::get().uri("/editSong/99").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_forms_render() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let resp = test::call_service(&app, TestRequest::get().uri("/song").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains(r#"action="/addSong""#));

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-01-01", "X")).to_request();
        test::call_service(&app, req).await;

        let resp =
            test::call_service(&app, TestRequest::get().uri("/editSong/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert!(body.contains(r#"value="2024-01-01""#));
        assert!(body.contains(r#"value="Ode""#));
    }

    #[actix_web::test]
    async fn test_edit_without_file_preserves_image() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some("cover.png"), &b"png"[..]));
        test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
        let image = songs.all().await.unwrap()[0].song.image.clone().unwrap();

        let mut parts = song_parts("Elegy", "2023-05-06", "Y");
        parts.push(("currentImage", None, image.as_bytes()));
        parts.push(("image", Some(""), &b""[..]));
        let resp =
            test::call_service(&app, multipart_post("/editSong/1", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/"));

        let song = songs.get_raw_by_id(1).await.unwrap().unwrap();
        assert_eq!(song.name, "Elegy");
        assert_eq!(song.artist, "Y");
        assert_eq!(song.image.as_deref(), Some(image.as_str()));
    }

    #[actix_web::test]
    async fn test_edit_with_new_file_replaces_image() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some("old.png"), &b"old"[..]));
        test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;
        let old = songs.all().await.unwrap()[0].song.image.clone().unwrap();

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("currentImage", None, old.as_bytes()));
        parts.push(("image", Some("new.png"), &b"new"[..]));
        test::call_service(&app, multipart_post("/editSong/1", &parts).to_request()).await;

        let image = songs.get_raw_by_id(1).await.unwrap().unwrap().image.unwrap();
        assert!(image.ends_with("-new.png"));
    }

    #[actix_web::test]
    async fn test_edit_clears_image_without_current() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some("cover.png"), &b"png"[..]));
        test::call_service(&app, multipart_post("/addSong", &parts).to_request()).await;

        let parts = song_parts("Ode", "2024-01-01", "X");
        test::call_service(&app, multipart_post("/editSong/1", &parts).to_request()).await;

        assert_eq!(songs.get_raw_by_id(1).await.unwrap().unwrap().image, None);
    }

    #[actix_web::test]
    async fn test_edit_rejects_path_in_current_image() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-01-01", "X")).to_request();
        test::call_service(&app, req).await;

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("currentImage", None, &b"../../secret.txt"[..]));
        let resp =
            test::call_service(&app, multipart_post("/editSong/1", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_edit_rejects_unknown_current_image() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-01-01", "X")).to_request();
        test::call_service(&app, req).await;

        let mut parts = song_parts("Elegy", "2024-01-01", "X");
        parts.push(("currentImage", None, &b"ghost.png"[..]));
        let resp =
            test::call_service(&app, multipart_post("/editSong/1", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Invalid image reference.");

        let song = songs.get_raw_by_id(1).await.unwrap().unwrap();
        assert_eq!(song.name, "Ode");
        assert_eq!(song.image, None);
    }

    #[actix_web::test]
    async fn test_edit_missing_song_discards_upload() {
        let (state, _dir) = state().await;
        let images_dir = state.paths.images_dir().to_path_buf();
        let app = init_app!(state);

        let mut parts = song_parts("Ode", "2024-01-01", "X");
        parts.push(("image", Some("cover.png"), &b"png"[..]));
        let resp =
            test::call_service(&app, multipart_post("/editSong/999", &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/"));
        assert!(stored_images(&images_dir).is_empty());
    }

    #[actix_web::test]
    async fn test_delete_song_and_missing_id() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        let req = multipart_post("/addSong", &song_parts("Ode", "2024-01-01", "X")).to_request();
        test::call_service(&app, req).await;

        let resp =
            test::call_service(&app, TestRequest::get().uri("/deleteSong/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/"));
        assert_eq!(songs.count().await.unwrap(), 0);

        let resp =
            test::call_service(&app, TestRequest::get().uri("/deleteSong/12345").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/"));
    }

    #[actix_web::test]
    async fn test_listing_store_error_is_500() {
        let (state, _dir) = state().await;
        let songs = state.songs.clone();
        let app = init_app!(state);

        songs.close().await;

        let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, "Error retrieving songs");
    }

    #[actix_web::test]
    async fn test_malformed_multipart() {
        let (state, _dir) = state().await;
        let app = init_app!(state);

        let req = TestRequest::post()
            .uri("/addSong")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload("garbage without boundaries")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
