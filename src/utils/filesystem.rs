//! Filesystem utilities for uploaded files

use uuid::Uuid;

/// Fallback name when the client sends nothing usable
const UNNAMED_UPLOAD: &str = "upload";

/// Longest original name kept in a stored filename
const MAX_ORIGINAL_LEN: usize = 100;

/// Reduce a client-provided filename to a safe basename
///
/// Directory components (either separator) are dropped and anything other
/// than ASCII alphanumerics, `.`, `-` and `_` becomes `_`. Leading dots are
/// stripped so the result is never hidden or a relative path.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return UNNAMED_UPLOAD.to_string();
    }

    // keep the tail so the extension survives truncation
    let skip = cleaned.len().saturating_sub(MAX_ORIGINAL_LEN);
    cleaned[skip..].to_string()
}

/// Build a collision-free stored name: `<uuid>-<sanitized original>`
pub fn unique_filename(original: &str) -> String {
    format!("{}-{}", Uuid::new_v4().simple(), sanitize_filename(original))
}
