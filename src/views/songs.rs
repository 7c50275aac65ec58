//! Song pages: listing, detail, create and edit forms

use std::fmt::Write;

use super::{escape, layout};
use crate::config::{IMAGES_URL_PREFIX, SONG_IMAGE_FIELD};
use crate::models::{Song, SongView};
use crate::utils::dates::format_form_date;

/// Public URL of a stored image
pub fn image_url(filename: &str) -> String {
    format!("{}/{}", IMAGES_URL_PREFIX, escape(filename))
}

fn image_cell(image: Option<&str>, alt: &str, width: u32) -> String {
    match image {
        Some(name) => format!(
            r#"<img src="{}" alt="{}" width="{}">"#,
            image_url(name),
            escape(alt),
            width
        ),
        None => "<span>No image</span>".to_string(),
    }
}

/// GET /
pub fn index(songs: &[SongView]) -> String {
    let mut content = String::from("<h1>Songs</h1>\n");

    if songs.is_empty() {
        content.push_str("<p>No songs yet. <a href=\"/song\">Add one</a>.</p>\n");
        return layout("Songs", &content);
    }

    content.push_str(
        "<table>\n<thead><tr><th>Image</th><th>Name</th><th>Date</th><th>Artist</th><th></th></tr></thead>\n<tbody>\n",
    );
    for view in songs {
        let song = &view.song;
        let _ = writeln!(
            content,
            r#"<tr><td>{image}</td><td><a href="/song/{id}">{name}</a></td><td>{date}</td><td>{artist}</td><td><a href="/editSong/{id}">Edit</a> <a href="/deleteSong/{id}" onclick="return confirm('Delete this song?')">Delete</a></td></tr>"#,
            image = image_cell(song.image.as_deref(), &song.name, 64),
            id = song.song_id,
            name = escape(&song.name),
            date = escape(&view.formatted_date),
            artist = escape(&song.artist),
        );
    }
    content.push_str("</tbody>\n</table>\n");

    layout("Songs", &content)
}

/// GET /song/{id}
pub fn detail(view: &SongView) -> String {
    let song = &view.song;
    let content = format!(
        r#"<h1>{name}</h1>
{image}
<dl>
<dt>Artist</dt><dd>{artist}</dd>
<dt>Date</dt><dd>{date}</dd>
</dl>
<p><a href="/editSong/{id}">Edit</a> | <a href="/">Back</a></p>
"#,
        name = escape(&song.name),
        image = image_cell(song.image.as_deref(), &song.name, 240),
        artist = escape(&song.artist),
        date = escape(&view.formatted_date),
        id = song.song_id,
    );

    layout(&song.name, &content)
}

fn song_fields(name: &str, date: &str, artist: &str) -> String {
    format!(
        r#"<p><label>Name <input type="text" name="name" value="{}" required></label></p>
<p><label>Date <input type="date" name="date" value="{}" required></label></p>
<p><label>Artist <input type="text" name="artist" value="{}" required></label></p>
<p><label>Image <input type="file" name="{}" accept="image/*"></label></p>
"#,
        escape(name),
        escape(date),
        escape(artist),
        SONG_IMAGE_FIELD,
    )
}

/// GET /song
pub fn add_form() -> String {
    let content = format!(
        r#"<h1>Add song</h1>
<form action="/addSong" method="post" enctype="multipart/form-data">
{}<p><button type="submit">Add</button></p>
</form>
"#,
        song_fields("", "", "")
    );

    layout("Add song", &content)
}

/// GET /editSong/{id}, pre-filled with the stored values
pub fn edit_form(song: &Song) -> String {
    let current = song.image.as_deref().unwrap_or_default();
    let preview = match song.image.as_deref() {
        Some(_) => format!(
            "<p>Current image: {}</p>\n",
            image_cell(song.image.as_deref(), &song.name, 120)
        ),
        None => String::new(),
    };

    let content = format!(
        r#"<h1>Edit song</h1>
<form action="/editSong/{id}" method="post" enctype="multipart/form-data">
{preview}{fields}<input type="hidden" name="currentImage" value="{current}">
<p><button type="submit">Save</button></p>
</form>
"#,
        id = song.song_id,
        preview = preview,
        fields = song_fields(&song.name, &format_form_date(song.date), &song.artist),
        current = escape(current),
    );

    layout("Edit song", &content)
}
