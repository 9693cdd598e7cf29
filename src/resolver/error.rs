use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolver request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("resolver returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("resolver response from {url} could not be parsed: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("resolver reported an error: {0}")]
    Api(String),
}

impl ResolveError {
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => ResolveError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => ResolveError::Request {
                url: url.to_string(),
                reason: transport.to_string(),
            },
        }
    }
}
