//! Utility modules for songbook

pub mod auth;
pub mod dates;
pub mod filesystem;
