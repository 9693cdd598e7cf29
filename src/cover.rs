//! Cover art download. A single attempt, bounded by a timeout, never retried.

use std::io::Read;

use log::debug;
use thiserror::Error;

use crate::{config::CoverConfig, domain::audio::CoverImage};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no cover url was provided")]
    NoCoverUrl,

    #[error("cover request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("cover request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read cover from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cover at {0} is empty")]
    Empty(String),
}

pub trait CoverFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<CoverImage, FetchError>;
}

pub struct HttpCoverFetcher {
    agent: ureq::Agent,
}

impl HttpCoverFetcher {
    pub fn new(config: &CoverConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(config.timeout()).build(),
        }
    }
}

impl CoverFetcher for HttpCoverFetcher {
    fn fetch(&self, url: &str) -> Result<CoverImage, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::NoCoverUrl);
        }

        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FetchError::Request {
                url: url.to_string(),
                reason: transport.to_string(),
            },
        })?;

        let mut data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|source| FetchError::Read {
                url: url.to_string(),
                source,
            })?;

        if data.is_empty() {
            return Err(FetchError::Empty(url.to_string()));
        }

        debug!("fetched cover {url} ({} bytes)", data.len());
        Ok(CoverImage::jpeg(data))
    }
}
