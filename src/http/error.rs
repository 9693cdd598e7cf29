use log::error;
use rouille::Response;
use serde::Serialize;

use crate::pipeline::PipelineError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    PayloadTooLarge(String),
    BadGateway(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidFilename(_) => {
                ApiError::BadRequest("Filename must be in format \"Artist - Title.mp3\"".into())
            }

            PipelineError::MetadataNotFound { .. } => ApiError::NotFound(err.to_string()),

            PipelineError::Resolver(e) => {
                error!("{e}");
                ApiError::BadGateway("metadata service unavailable".into())
            }

            PipelineError::Transcode(_) | PipelineError::TagWrite(_) => {
                error!("{err}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::Internal(_) => 500,
            ApiError::BadGateway(_) => 502,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn into_response(self) -> Response {
        Response::json(&ErrorBody {
            message: self.message(),
        })
        .with_status_code(self.status_code())
    }
}
