use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Artist and title recovered from an uploaded file name.
///
/// The file name is the only source of the lookup query, so the format is strict:
/// `"<Artist> - <Title>.mp3"`. Only the first two dash-separated segments are used,
/// anything after the second dash is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub artist: String,
    pub title: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("filename must be in format \"Artist - Title.mp3\", got \"{0}\"")]
pub struct InvalidFilename(pub String);

impl TrackQuery {
    pub fn from_file_name(file_name: &str) -> Result<Self, InvalidFilename> {
        let stem = file_name.replacen(".mp3", "", 1);
        let mut segments = stem.split('-');

        match (segments.next(), segments.next()) {
            (Some(artist), Some(title)) => Ok(Self {
                artist: artist.trim().to_string(),
                title: title.trim().to_string(),
            }),
            _ => Err(InvalidFilename(file_name.to_string())),
        }
    }

    /// `"<Artist> - <Title>.mp3"`
    pub fn file_name(&self) -> String {
        format!("{} - {}.mp3", self.artist, self.title)
    }
}

/// Canonical metadata for one track, as returned by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Empty when the resolver had no artwork for the album.
    #[serde(rename = "cover")]
    pub cover_url: String,
    /// Comma-joined genre names.
    pub genres: String,
    /// ISO date, `YYYY-MM-DD`.
    pub release_date: String,
    /// `None` when no track on the album matched the title exactly.
    #[serde(rename = "track_no")]
    pub track_number: Option<u32>,
}

impl TrackMetadata {
    /// Release year as a four digit string, or `None` if the date carries no year.
    pub fn release_year(&self) -> Option<String> {
        let date = self.release_date.trim();
        if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Some(format!("{:04}", parsed.year()));
        }

        let year: String = date.chars().take(4).collect();
        if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
            Some(year)
        } else {
            None
        }
    }

    pub fn cover_url(&self) -> Option<&str> {
        let url = self.cover_url.trim();
        (!url.is_empty()).then_some(url)
    }
}
