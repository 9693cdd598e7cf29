//! Deezer public API client.
//!
//! The chain is strictly sequential: `/search` gives the album id, which feeds
//! `/album/<id>` (genres, release date) and `/album/<id>/tracks` (track position).

use log::{debug, info};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::ResolverConfig,
    domain::track::{TrackMetadata, TrackQuery},
    resolver::{MetadataResolver, error::ResolveError},
};

pub struct DeezerResolver {
    agent: ureq::Agent,
    base_url: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    artist: Named,
    album: AlbumRef,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    id: u64,
    title: String,
    #[serde(default)]
    cover_medium: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Album {
    genres: Genres,
    release_date: String,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Genres {
    data: Vec<Named>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AlbumTracks {
    data: Vec<AlbumTrack>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct AlbumTrack {
    title: String,
    #[serde(default)]
    track_position: Option<u32>,
}

impl DeezerResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ResolveError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url} {query:?}");

        let mut request = self.agent.get(&url).set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = request
            .call()
            .map_err(|e| ResolveError::from_ureq(&url, e))?;

        response
            .into_json::<T>()
            .map_err(|e| ResolveError::InvalidResponse {
                url,
                reason: e.to_string(),
            })
    }
}

fn check(error: &Option<ApiError>) -> Result<(), ResolveError> {
    match error {
        Some(err) => Err(ResolveError::Api(err.message.clone())),
        None => Ok(()),
    }
}

/// Deezer search syntax: `artist:"<artist>" track:"<title>"`
fn search_expression(query: &TrackQuery) -> String {
    format!(r#"artist:"{}" track:"{}""#, query.artist, query.title)
}

fn assemble(hit: SearchHit, album: Album, tracks: AlbumTracks) -> TrackMetadata {
    let track_number = tracks
        .data
        .iter()
        .find(|track| track.title == hit.title)
        .and_then(|track| track.track_position);

    let genres = album
        .genres
        .data
        .iter()
        .map(|genre| genre.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    TrackMetadata {
        title: hit.title,
        artist: hit.artist.name,
        album: hit.album.title,
        cover_url: hit.album.cover_medium.unwrap_or_default(),
        genres,
        release_date: album.release_date,
        track_number,
    }
}

impl MetadataResolver for DeezerResolver {
    fn resolve(&self, query: &TrackQuery) -> Result<Option<TrackMetadata>, ResolveError> {
        let expression = search_expression(query);
        let search: SearchResponse = self.get_json("/search", &[("q", &expression)])?;
        check(&search.error)?;

        let Some(hit) = search.data.into_iter().next() else {
            info!("no match for {expression}");
            return Ok(None);
        };

        let album_id = hit.album.id.to_string();
        let album: Album = self.get_json(&format!("/album/{album_id}"), &[])?;
        check(&album.error)?;
        let tracks: AlbumTracks = self.get_json(&format!("/album/{album_id}/tracks"), &[])?;
        check(&tracks.error)?;

        let metadata = assemble(hit, album, tracks);
        if metadata.track_number.is_none() {
            info!(
                "no exact title match for \"{}\" on album {album_id}, track number left unresolved",
                metadata.title
            );
        }
        Ok(Some(metadata))
    }
}
