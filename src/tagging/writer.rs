//! Byte-exact ID3v2.4 serialization.
//!
//! Layout written here:
//!
//! ```text
//! "ID3" 04 00 | flags 00 | synchsafe size (4) | frames... | audio...
//! frame: id (4) | synchsafe body size (4) | flags 00 00 | body
//! ```
//!
//! Every string is stored as UTF-16 with a byte order mark (encoding byte `0x01`),
//! terminated by two zero bytes.

use log::debug;

use crate::tagging::{
    error::TagWriteError,
    frame::{AttachedPicture, Frame},
    synchsafe::{self, MAX_SYNCHSAFE},
};

pub const HEADER_LEN: usize = 10;
pub const FRAME_HEADER_LEN: usize = 10;

const VERSION: [u8; 2] = [4, 0];
const ENCODING_UTF16: u8 = 0x01;
const BOM_LE: [u8; 2] = [0xFF, 0xFE];

/// Largest frame area accepted by default.
pub const DEFAULT_MAX_TAG_SIZE: u32 = 2_097_151;

#[derive(Debug, Clone)]
pub struct TagWriter {
    max_tag_size: u32,
}

impl Default for TagWriter {
    fn default() -> Self {
        Self {
            max_tag_size: DEFAULT_MAX_TAG_SIZE,
        }
    }
}

impl TagWriter {
    /// Limits above the synchsafe range are clamped to it.
    pub fn new(max_tag_size: u32) -> Self {
        Self {
            max_tag_size: max_tag_size.min(MAX_SYNCHSAFE),
        }
    }

    pub fn max_tag_size(&self) -> u32 {
        self.max_tag_size
    }

    /// Serialize `frames` into a complete tag and prepend it to `audio`.
    ///
    /// The audio bytes are copied untouched after the tag. Either the whole file is
    /// returned or nothing is.
    pub fn write(&self, frames: &[Frame], audio: &[u8]) -> Result<Vec<u8>, TagWriteError> {
        let tag = self.render_tag(frames)?;

        let mut file = Vec::with_capacity(tag.len() + audio.len());
        file.extend_from_slice(&tag);
        file.extend_from_slice(audio);
        Ok(file)
    }

    /// Header plus frame area, without any audio.
    pub fn render_tag(&self, frames: &[Frame]) -> Result<Vec<u8>, TagWriteError> {
        let mut area = Vec::new();
        for frame in frames {
            self.write_frame(&mut area, frame)?;
        }

        let size = area.len() as u64;
        if size > self.max_tag_size as u64 {
            return Err(TagWriteError::TagTooLarge {
                size,
                limit: self.max_tag_size,
            });
        }

        let mut tag = Vec::with_capacity(HEADER_LEN + area.len());
        tag.extend_from_slice(b"ID3");
        tag.extend_from_slice(&VERSION);
        tag.push(0x00);
        tag.extend_from_slice(&synchsafe::encode(size)?);
        tag.extend_from_slice(&area);

        debug!("rendered ID3v2.4 tag: {} frames, {} bytes", frames.len(), tag.len());
        Ok(tag)
    }

    fn write_frame(&self, out: &mut Vec<u8>, frame: &Frame) -> Result<(), TagWriteError> {
        let id = frame.id();
        if !is_valid_frame_id(id) {
            return Err(TagWriteError::InvalidFrameId(id.to_string()));
        }

        let body = match frame {
            Frame::Text { value, .. } => text_body(value),
            Frame::AttachedPicture(picture) => picture_body(picture)?,
        };

        let size = body.len() as u64;
        if size > self.max_tag_size as u64 {
            return Err(TagWriteError::FrameTooLarge {
                id: id.to_string(),
                size,
                limit: self.max_tag_size,
            });
        }

        out.extend_from_slice(id.as_bytes());
        out.extend_from_slice(&synchsafe::encode(size)?);
        out.extend_from_slice(&[0x00, 0x00]);
        out.extend_from_slice(&body);
        Ok(())
    }
}

/// Length of an ID3v2 tag at the start of `bytes`, footer included, or 0 if there is none.
pub fn existing_tag_len(bytes: &[u8]) -> usize {
    if bytes.len() < HEADER_LEN || &bytes[..3] != b"ID3" {
        return 0;
    }
    let size_bytes = [bytes[6], bytes[7], bytes[8], bytes[9]];
    if size_bytes.iter().any(|b| b & 0x80 != 0) {
        return 0;
    }

    let has_footer = bytes[5] & 0x10 != 0;
    let len = HEADER_LEN + synchsafe::decode(size_bytes) as usize + if has_footer { 10 } else { 0 };
    len.min(bytes.len())
}

fn is_valid_frame_id(id: &str) -> bool {
    id.len() == 4
        && id
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

fn push_utf16(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&BOM_LE);
    for unit in value.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&[0x00, 0x00]);
}

fn text_body(value: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(1 + 2 + value.len() * 2 + 2);
    body.push(ENCODING_UTF16);
    push_utf16(&mut body, value);
    body
}

fn picture_body(picture: &AttachedPicture) -> Result<Vec<u8>, TagWriteError> {
    if !picture.mime_type.is_ascii() {
        return Err(TagWriteError::InvalidMimeType(picture.mime_type.clone()));
    }

    let mut body = Vec::with_capacity(picture.data.len() + 64);
    body.push(ENCODING_UTF16);
    // MIME type is always Latin-1, whatever the frame encoding.
    body.extend_from_slice(picture.mime_type.as_bytes());
    body.push(0x00);
    body.push(picture.picture_type);
    push_utf16(&mut body, &picture.description);
    body.extend_from_slice(&picture.data);
    Ok(body)
}
