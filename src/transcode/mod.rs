//! Audio transcoding to a normalized MP3 stream.
//!
//! The engine is external; this module only guarantees that a call either returns the
//! complete encoded stream or an error, never a partial file.

pub mod error;
pub mod ffmpeg;

pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;

pub trait Transcoder: Send + Sync {
    /// Encode `input` (any container the engine understands) into a bare MP3 stream
    /// without tags.
    fn transcode(&self, input: &[u8]) -> Result<Vec<u8>, TranscodeError>;
}
