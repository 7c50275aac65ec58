//! Login and registration routes
//!
//! There is no session: a successful login only answers with a greeting.

use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use super::{redirect, AppError, AppState};
use crate::models::NewUser;
use crate::stores::UserStoreError;
use crate::utils::auth::{hash_password, verify_password};
use crate::views::{self, render};

/// login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// registration form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

fn plain_text(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// Username with surrounding whitespace removed; blank counts as absent
fn trimmed_username(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// GET /login
#[get("/login")]
pub async fn login_form() -> HttpResponse {
    render(views::auth::login_form())
}

/// POST /login
///
/// Failure is a 200 with a message, same as success.
#[post("/login")]
pub async fn login(
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    const INVALID: &str = "Invalid username or password.";

    let (Some(username), Some(password)) = (
        trimmed_username(&form.username),
        form.password.as_deref(),
    ) else {
        return Ok(plain_text(INVALID.to_string()));
    };

    let user = state
        .users
        .find_by_username(username)
        .await
        .map_err(AppError::store("Error logging in"))?;

    let verified = match user {
        Some(user) => verify_password(password, &user.password).unwrap_or_else(|e| {
            tracing::warn!("Stored password for {} is unusable: {:#}", user.username, e);
            false
        }),
        None => false,
    };

    if verified {
        tracing::info!("User {} logged in", username);
        Ok(plain_text(format!("Welcome, {}!", username)))
    } else {
        Ok(plain_text(INVALID.to_string()))
    }
}

/// GET /register
#[get("/register")]
pub async fn register_form() -> HttpResponse {
    render(views::auth::register_form())
}

/// POST /register
#[post("/register")]
pub async fn register(
    form: web::Form<RegisterForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (Some(username), Some(password), Some(confirm)) = (
        trimmed_username(&form.username),
        non_empty(&form.password),
        non_empty(&form.confirm_password),
    ) else {
        return Err(AppError::BadRequest("All fields are required."));
    };

    if password != confirm {
        return Err(AppError::BadRequest("Passwords do not match."));
    }

    let existing = state
        .users
        .find_by_username(username)
        .await
        .map_err(AppError::store("Error registering user"))?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Username already exists."));
    }

    match state
        .users
        .insert(NewUser::new(username, hash_password(password)))
        .await
    {
        Ok(id) => {
            tracing::info!("Registered user {} ({})", username, id);
            Ok(redirect("/login"))
        }
        Err(UserStoreError::UsernameTaken(_)) => {
            Err(AppError::BadRequest("Username already exists."))
        }
        Err(UserStoreError::Backend(e)) => Err(AppError::store("Error registering user")(e)),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_form)
        .service(login)
        .service(register_form)
        .service(register);
}
