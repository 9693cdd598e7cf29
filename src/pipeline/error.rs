use thiserror::Error;

use crate::{
    domain::track::InvalidFilename, resolver::ResolveError, tagging::TagWriteError,
    transcode::TranscodeError,
};

/// Fatal pipeline failures. A missing cover is not one of them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidFilename(#[from] InvalidFilename),

    #[error("no match found for \"{artist} - {title}\"")]
    MetadataNotFound { artist: String, title: String },

    #[error("metadata lookup failed: {0}")]
    Resolver(#[from] ResolveError),

    #[error("transcoding failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("failed to write tag: {0}")]
    TagWrite(#[from] TagWriteError),
}
