//! The tagging pipeline as an explicit state machine:
//!
//! ```text
//! ParsingFilename -> ResolvingMetadata -> (FetchingCover || Transcoding)
//!     -> BuildingFrames -> WritingContainer -> Done
//! ```
//!
//! Any stage may move to `Failed`. A cover that cannot be fetched only drops the
//! picture frame; every other failure is fatal and no output is produced.

pub mod error;

use std::{fmt, thread};

use log::{debug, info, warn};

pub use error::PipelineError;

use crate::{
    cover::{CoverFetcher, FetchError},
    domain::{
        audio::{AudioPayload, CoverImage},
        track::{TrackMetadata, TrackQuery},
    },
    resolver::MetadataResolver,
    tagging::{Frame, TagWriter, build_frames, writer::existing_tag_len},
    transcode::Transcoder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParsingFilename,
    ResolvingMetadata,
    FetchingCoverAndTranscoding,
    BuildingFrames,
    WritingContainer,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How the audio stream is produced before tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Re-encode through the transcoder.
    Transcode,
    /// Keep the uploaded MP3 stream, only replacing its ID3v2 tag.
    PassThrough,
}

/// A finished, tagged MP3.
#[derive(Debug, Clone)]
pub struct TaggedTrack {
    /// `"<Artist> - <Title>.mp3"`
    pub file_name: String,
    pub metadata: TrackMetadata,
    pub has_cover: bool,
    pub bytes: Vec<u8>,
}

enum State {
    ParsingFilename,
    ResolvingMetadata(TrackQuery),
    FetchingCoverAndTranscoding(TrackQuery, TrackMetadata),
    BuildingFrames {
        query: TrackQuery,
        metadata: TrackMetadata,
        cover: Option<CoverImage>,
        audio: Vec<u8>,
    },
    WritingContainer {
        query: TrackQuery,
        metadata: TrackMetadata,
        frames: Vec<Frame>,
        audio: Vec<u8>,
    },
    Done(TaggedTrack),
    Failed(PipelineError),
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::ParsingFilename => Stage::ParsingFilename,
            State::ResolvingMetadata(_) => Stage::ResolvingMetadata,
            State::FetchingCoverAndTranscoding(..) => Stage::FetchingCoverAndTranscoding,
            State::BuildingFrames { .. } => Stage::BuildingFrames,
            State::WritingContainer { .. } => Stage::WritingContainer,
            State::Done(_) => Stage::Done,
            State::Failed(_) => Stage::Failed,
        }
    }
}

pub struct Pipeline {
    resolver: Box<dyn MetadataResolver>,
    cover_fetcher: Box<dyn CoverFetcher>,
    transcoder: Box<dyn Transcoder>,
    writer: TagWriter,
}

impl Pipeline {
    pub fn new(
        resolver: Box<dyn MetadataResolver>,
        cover_fetcher: Box<dyn CoverFetcher>,
        transcoder: Box<dyn Transcoder>,
        writer: TagWriter,
    ) -> Self {
        Self {
            resolver,
            cover_fetcher,
            transcoder,
            writer,
        }
    }

    /// Parse the file name and resolve its metadata, without touching any audio.
    pub fn lookup(&self, file_name: &str) -> Result<TrackMetadata, PipelineError> {
        let query = TrackQuery::from_file_name(file_name)?;
        self.resolve(&query)
    }

    pub fn run(&self, payload: &AudioPayload, mode: AudioMode) -> Result<TaggedTrack, PipelineError> {
        self.run_with(payload, mode, &mut |_| {})
    }

    /// Like [`Pipeline::run`], reporting every stage entered to `observer`.
    pub fn run_with(
        &self,
        payload: &AudioPayload,
        mode: AudioMode,
        observer: &mut dyn FnMut(Stage),
    ) -> Result<TaggedTrack, PipelineError> {
        let mut state = State::ParsingFilename;
        loop {
            let stage = state.stage();
            debug!("{}: {stage}", payload.file_name);
            observer(stage);

            state = match state {
                State::Done(track) => {
                    info!(
                        "tagged {} as \"{}\" ({} bytes, cover: {})",
                        payload.file_name,
                        track.file_name,
                        track.bytes.len(),
                        track.has_cover
                    );
                    return Ok(track);
                }
                State::Failed(err) => {
                    warn!("pipeline failed for {}: {err}", payload.file_name);
                    return Err(err);
                }
                state => self.step(state, payload, mode),
            };
        }
    }

    fn step(&self, state: State, payload: &AudioPayload, mode: AudioMode) -> State {
        match state {
            State::ParsingFilename => match TrackQuery::from_file_name(&payload.file_name) {
                Ok(query) => State::ResolvingMetadata(query),
                Err(err) => State::Failed(err.into()),
            },

            State::ResolvingMetadata(query) => match self.resolve(&query) {
                Ok(metadata) => State::FetchingCoverAndTranscoding(query, metadata),
                Err(err) => State::Failed(err),
            },

            State::FetchingCoverAndTranscoding(query, metadata) => {
                let (cover, audio) = self.fetch_cover_and_encode(&metadata, &payload.bytes, mode);
                match audio {
                    Ok(audio) => State::BuildingFrames {
                        query,
                        metadata,
                        cover,
                        audio,
                    },
                    Err(err) => State::Failed(err),
                }
            }

            State::BuildingFrames {
                query,
                metadata,
                cover,
                audio,
            } => State::WritingContainer {
                frames: build_frames(&metadata, cover.as_ref()),
                query,
                metadata,
                audio,
            },

            State::WritingContainer {
                query,
                metadata,
                frames,
                audio,
            } => match self.writer.write(&frames, &audio) {
                Ok(bytes) => State::Done(TaggedTrack {
                    file_name: output_file_name(&query, &metadata),
                    has_cover: frames.iter().any(|f| matches!(f, Frame::AttachedPicture(_))),
                    metadata,
                    bytes,
                }),
                Err(err) => State::Failed(err.into()),
            },

            terminal @ (State::Done(_) | State::Failed(_)) => terminal,
        }
    }

    fn resolve(&self, query: &TrackQuery) -> Result<TrackMetadata, PipelineError> {
        self.resolver
            .resolve(query)?
            .ok_or_else(|| PipelineError::MetadataNotFound {
                artist: query.artist.clone(),
                title: query.title.clone(),
            })
    }

    /// Cover download and audio encoding share no data, so the cover is fetched on a
    /// scoped thread while the audio is encoded on this one.
    fn fetch_cover_and_encode(
        &self,
        metadata: &TrackMetadata,
        input: &[u8],
        mode: AudioMode,
    ) -> (Option<CoverImage>, Result<Vec<u8>, PipelineError>) {
        thread::scope(|scope| {
            let cover = scope.spawn(|| self.fetch_cover(metadata));

            let audio = match mode {
                AudioMode::Transcode => self.transcoder.transcode(input).map_err(PipelineError::from),
                AudioMode::PassThrough => Ok(input[existing_tag_len(input)..].to_vec()),
            };

            let cover = cover.join().unwrap_or_else(|_| {
                warn!("cover fetch thread panicked, continuing without cover");
                None
            });
            (cover, audio)
        })
    }

    fn fetch_cover(&self, metadata: &TrackMetadata) -> Option<CoverImage> {
        let result = match metadata.cover_url() {
            Some(url) => self.cover_fetcher.fetch(url),
            None => Err(FetchError::NoCoverUrl),
        };

        match result {
            Ok(cover) => Some(cover),
            Err(err) => {
                warn!("continuing without cover: {err}");
                None
            }
        }
    }
}

/// Name for the tagged file, from the resolved names when present.
fn output_file_name(query: &TrackQuery, metadata: &TrackMetadata) -> String {
    let pick = |resolved: &str, parsed: &str| {
        let name = if resolved.trim().is_empty() { parsed } else { resolved };
        name.trim().replace(['/', '\\'], "_")
    };
    TrackQuery {
        artist: pick(&metadata.artist, &query.artist),
        title: pick(&metadata.title, &query.title),
    }
    .file_name()
}
