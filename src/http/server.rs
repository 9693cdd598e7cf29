use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::{io::Read, sync::Arc};

use crate::{
    config::HttpConfig,
    domain::{audio::AudioPayload, track::TrackMetadata},
    http::{cors::Origin, error::ApiError},
    pipeline::{AudioMode, Pipeline},
};

pub struct HttpServer {
    pipeline: Arc<Pipeline>,
    pub config: HttpConfig,
}

#[derive(Deserialize)]
struct RetrieveRequest {
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct RetrieveResponse {
    message: String,
    data: TrackMetadata,
}

impl HttpServer {
    pub fn new(pipeline: Pipeline, config: HttpConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let origin = Origin::check(request, &self.config.allowed_origins);
        let response = match &origin {
            Origin::Denied(o) => {
                info!("rejecting origin {o}");
                ApiError::Forbidden("Not allowed by CORS".into()).into_response()
            }
            _ if request.method() == "OPTIONS" => origin.preflight(),
            _ => origin.apply(self.route(request)),
        };

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn route(&self, request: &Request) -> Response {
        rouille::router!(request,
            (GET) (/api/status) => {
                Response::json(&MessageResponse {
                    message: "API is currently running!".into(),
                })
            },
            (POST) (/api/retrieve-mp3-data) => {
                self.handle_retrieve(request).unwrap_or_else(ApiError::into_response)
            },
            (POST) (/api/convert) => {
                self.handle_convert(request).unwrap_or_else(ApiError::into_response)
            },
            _ => ApiError::NotFound("not found".into()).into_response()
        )
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.raw_url());
    }

    /// Metadata only: `{"file_name": "Artist - Title.mp3"}`.
    fn handle_retrieve(&self, request: &Request) -> Result<Response, ApiError> {
        let body: RetrieveRequest = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;

        let file_name = body
            .file_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;

        let metadata = self.pipeline.lookup(&file_name)?;

        Ok(Response::json(&RetrieveResponse {
            message: "Success!".into(),
            data: metadata,
        }))
    }

    /// Raw audio body, `?file_name=Artist - Title.mp3[&transcode=false]`.
    fn handle_convert(&self, request: &Request) -> Result<Response, ApiError> {
        let file_name = request
            .get_param("file_name")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;

        let mode = match request.get_param("transcode").as_deref() {
            Some("false") | Some("0") => AudioMode::PassThrough,
            _ => AudioMode::Transcode,
        };

        let bytes = self.read_upload(request)?;
        let payload = AudioPayload::new(file_name, bytes);
        let track = self.pipeline.run(&payload, mode)?;

        Ok(Response::from_data("audio/mpeg", track.bytes)
            .with_additional_header("Content-Disposition", content_disposition(&track.file_name)))
    }

    fn read_upload(&self, request: &Request) -> Result<Vec<u8>, ApiError> {
        let limit = self.config.max_upload_bytes();
        let body = request
            .data()
            .ok_or_else(|| ApiError::Internal("request body already consumed".into()))?;

        let mut bytes = Vec::new();
        body.take(limit.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("No file uploaded".into()));
        }
        if bytes.len() as u64 > limit {
            return Err(ApiError::PayloadTooLarge(format!(
                "upload exceeds {} MB",
                self.config.max_upload_mb
            )));
        }
        Ok(bytes)
    }
}

/// `attachment` header with an ASCII fallback name and the exact UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let encoded = urlencoding::encode(file_name);

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
