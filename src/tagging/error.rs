use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagWriteError {
    #[error("{value} does not fit in a synchsafe integer (max {max})")]
    SynchsafeOverflow { value: u64, max: u32 },

    #[error("frame {id} body is {size} bytes, limit is {limit}")]
    FrameTooLarge { id: String, size: u64, limit: u32 },

    #[error("tag is {size} bytes, limit is {limit}")]
    TagTooLarge { size: u64, limit: u32 },

    #[error("picture MIME type {0:?} is not ASCII")]
    InvalidMimeType(String),

    #[error("invalid frame id {0:?}")]
    InvalidFrameId(String),
}
