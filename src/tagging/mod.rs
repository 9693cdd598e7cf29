//! ID3v2.4 tag construction.
//!
//! Frames are built once from resolved metadata into an immutable, ordered list and
//! serialized in a single pass in front of the audio stream.

pub mod error;
pub mod frame;
pub mod synchsafe;
pub mod writer;

pub use error::TagWriteError;
pub use frame::{Frame, build_frames};
pub use writer::TagWriter;
