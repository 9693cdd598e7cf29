/// Raw bytes of an uploaded audio file together with the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AudioPayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// MIME type asserted for every cover, whatever the fetched bytes actually are.
pub const COVER_MIME_TYPE: &str = "image/jpeg";

/// Cover art bytes to embed as the front cover picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl CoverImage {
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: COVER_MIME_TYPE.to_string(),
            data,
        }
    }
}
