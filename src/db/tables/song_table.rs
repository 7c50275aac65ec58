//! Song table operations

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};

use crate::db::DbEngine;
use crate::models::{NewSong, Song, SongView};

/// Database row for songs table
#[derive(Debug, FromRow)]
struct SongRow {
    #[sqlx(rename = "songId")]
    song_id: i64,
    name: String,
    date: NaiveDate,
    artist: String,
    image: Option<String>,
}

impl SongRow {
    fn into_song(self) -> Song {
        Song {
            song_id: self.song_id,
            name: self.name,
            date: self.date,
            artist: self.artist,
            image: self.image,
        }
    }
}

/// Song table operations
#[derive(Debug, Clone)]
pub struct SongTable {
    pool: SqlitePool,
}

impl SongTable {
    pub fn new(engine: &DbEngine) -> Self {
        Self {
            pool: engine.pool().clone(),
        }
    }

    /// Get all songs with display dates
    pub async fn all(&self) -> Result<Vec<SongView>> {
        let rows: Vec<SongRow> = sqlx::query_as("SELECT * FROM songs ORDER BY songId")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_song().into_view()).collect())
    }

    /// Get a song by ID with its display date
    pub async fn get_by_id(&self, song_id: i64) -> Result<Option<SongView>> {
        Ok(self.get_raw_by_id(song_id).await?.map(Song::into_view))
    }

    /// Get a song by ID as stored, for form pre-fill
    pub async fn get_raw_by_id(&self, song_id: i64) -> Result<Option<Song>> {
        let row: Option<SongRow> = sqlx::query_as("SELECT * FROM songs WHERE songId = ?")
            .bind(song_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_song()))
    }

    /// Insert a song, returning its new ID
    pub async fn insert(&self, song: &NewSong) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO songs (name, date, artist, image) VALUES (?, ?, ?, ?)")
                .bind(&song.name)
                .bind(song.date)
                .bind(&song.artist)
                .bind(&song.image)
                .execute(&self.pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replace all fields of a song
    ///
    /// Returns whether a row was changed; a missing ID is not an error.
    pub async fn update(&self, song_id: i64, song: &NewSong) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE songs SET name = ?, date = ?, artist = ?, image = ? WHERE songId = ?",
        )
        .bind(&song.name)
        .bind(song.date)
        .bind(&song.artist)
        .bind(&song.image)
        .bind(song_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a song by ID; deleting a missing ID succeeds
    pub async fn delete(&self, song_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE songId = ?")
            .bind(song_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get song count
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Close the underlying pool; later queries fail
    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
