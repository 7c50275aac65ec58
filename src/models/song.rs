//! Song model

use chrono::NaiveDate;

use crate::utils::dates::format_display_date;

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Database ID, assigned by the store
    pub song_id: i64,
    /// Song title
    pub name: String,
    /// Release date
    pub date: NaiveDate,
    /// Performing artist
    pub artist: String,
    /// Stored image filename under the public images directory
    pub image: Option<String>,
}

impl Song {
    /// Attach the display-formatted date
    pub fn into_view(self) -> SongView {
        let formatted_date = format_display_date(self.date);
        SongView {
            song: self,
            formatted_date,
        }
    }
}

/// A song together with its date rendered as "Month DD, YYYY"
#[derive(Debug, Clone)]
pub struct SongView {
    pub song: Song,
    pub formatted_date: String,
}

/// Field values for creating or replacing a song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub name: String,
    pub date: NaiveDate,
    pub artist: String,
    pub image: Option<String>,
}
