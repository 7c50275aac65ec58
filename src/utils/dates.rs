//! Date utilities

use chrono::NaiveDate;

/// Format used by the create/edit forms (`<input type="date">`)
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date as "Month DD, YYYY" (e.g. "January 01, 2024")
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Parse a form date value; surrounding whitespace is ignored
pub fn parse_form_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), FORM_DATE_FORMAT).ok()
}

/// Render a date back into the form input format
pub fn format_form_date(date: NaiveDate) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}
