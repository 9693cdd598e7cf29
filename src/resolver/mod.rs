//! Metadata lookup.
//!
//! The resolver is a black box to the rest of the crate: given an artist and title it
//! returns canonical [`TrackMetadata`] or nothing.

pub mod deezer;
pub mod error;

pub use deezer::DeezerResolver;
pub use error::ResolveError;

use crate::domain::track::{TrackMetadata, TrackQuery};

pub trait MetadataResolver: Send + Sync {
    /// `Ok(None)` means the lookup worked but nothing matched.
    fn resolve(&self, query: &TrackQuery) -> Result<Option<TrackMetadata>, ResolveError>;
}
