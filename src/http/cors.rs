//! Origin allow-list for browser clients.

use rouille::{Request, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// No `Origin` header: same-origin or non-browser client.
    Absent,
    Allowed(String),
    Denied(String),
}

impl Origin {
    pub fn check(request: &Request, allowed_origins: &[String]) -> Self {
        match request.header("Origin") {
            None => Origin::Absent,
            Some(origin) if allowed_origins.iter().any(|o| o == origin) => {
                Origin::Allowed(origin.to_string())
            }
            Some(origin) => Origin::Denied(origin.to_string()),
        }
    }

    pub fn apply(&self, response: Response) -> Response {
        match self {
            Origin::Allowed(origin) => response
                .with_additional_header("Access-Control-Allow-Origin", origin.clone())
                .with_additional_header("Access-Control-Expose-Headers", "Content-Disposition")
                .with_additional_header("Vary", "Origin"),
            Origin::Absent | Origin::Denied(_) => response,
        }
    }

    /// Answer to an `OPTIONS` preflight from an allowed origin.
    pub fn preflight(&self) -> Response {
        self.apply(
            Response::empty_204()
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type")
                .with_additional_header("Access-Control-Max-Age", "600"),
        )
    }
}
