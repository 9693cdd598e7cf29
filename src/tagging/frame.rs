use crate::domain::{audio::CoverImage, track::TrackMetadata};

pub const TITLE: &str = "TIT2";
pub const ARTIST: &str = "TPE1";
pub const ALBUM: &str = "TALB";
pub const GENRE: &str = "TCON";
pub const TRACK: &str = "TRCK";
/// ID3v2.4 recording time, the successor of v2.3 `TYER`.
pub const YEAR: &str = "TDRC";
pub const PICTURE: &str = "APIC";

pub const FRONT_COVER: u8 = 3;
pub const COVER_DESCRIPTION: &str = "Cover";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text { id: String, value: String },
    AttachedPicture(AttachedPicture),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPicture {
    pub mime_type: String,
    pub picture_type: u8,
    pub description: String,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn text(id: &str, value: impl Into<String>) -> Self {
        Frame::Text {
            id: id.to_string(),
            value: value.into(),
        }
    }

    pub fn front_cover(cover: &CoverImage) -> Self {
        Frame::AttachedPicture(AttachedPicture {
            mime_type: cover.mime_type.clone(),
            picture_type: FRONT_COVER,
            description: COVER_DESCRIPTION.to_string(),
            data: cover.data.clone(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Frame::Text { id, .. } => id,
            Frame::AttachedPicture(_) => PICTURE,
        }
    }
}

/// Frames for `metadata` in canonical order: title, artist, album, genre, track,
/// year, then the front cover if one was fetched.
///
/// Track and year are left out when unknown. Nothing here can fail.
pub fn build_frames(metadata: &TrackMetadata, cover: Option<&CoverImage>) -> Vec<Frame> {
    let mut frames = vec![
        Frame::text(TITLE, metadata.title.as_str()),
        Frame::text(ARTIST, metadata.artist.as_str()),
        Frame::text(ALBUM, metadata.album.as_str()),
        Frame::text(GENRE, metadata.genres.as_str()),
    ];

    if let Some(track) = metadata.track_number {
        frames.push(Frame::text(TRACK, track.to_string()));
    }
    if let Some(year) = metadata.release_year() {
        frames.push(Frame::text(YEAR, year));
    }
    if let Some(cover) = cover {
        frames.push(Frame::front_cover(cover));
    }

    frames
}
