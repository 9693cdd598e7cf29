use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("input audio is empty")]
    EmptyInput,

    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder exited with {status}: {message}")]
    Failed { status: String, message: String },

    #[error("encoder did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("encoder produced no audio")]
    EmptyOutput,

    #[error("transcode io error: {0}")]
    Io(#[from] std::io::Error),
}
