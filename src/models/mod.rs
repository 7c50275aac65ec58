//! Data models for songbook

mod song;
mod user;

pub use song::{NewSong, Song, SongView};
pub use user::{NewUser, User};
