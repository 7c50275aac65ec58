//! HTML views
//!
//! Each page is a plain function from view data to markup. All dynamic text
//! goes through [`escape`].

pub mod auth;
pub mod songs;

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use std::fmt::Write;

/// Escape text for use in HTML content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap page content in the shared layout
pub fn layout(title: &str, content: &str) -> String {
    let mut page = String::new();
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<nav>
<a href="/">Songs</a> | <a href="/song">Add song</a> | <a href="/login">Login</a> | <a href="/register">Register</a>
</nav>
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
        content = content
    );
    page
}

/// 200 response carrying a rendered page
pub fn render(page: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}
