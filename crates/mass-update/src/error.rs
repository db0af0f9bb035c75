//! Error type for remote API failures.

use thiserror::Error;

/// A failed call to the incidents API.
///
/// Transport, protocol, authentication and rate-limit failures all surface as
/// this one kind. When the server answered, the raw body is kept so it can be
/// shown to the operator verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: Option<u16>,
    response_body: Option<String>,
}

impl ApiError {
    /// Error with no HTTP response attached.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            response_body: None,
        }
    }

    /// Error for a response the server sent back with a failing status.
    #[must_use]
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        Self {
            message: format!("API returned HTTP {status}"),
            status: Some(status),
            response_body: Some(body.into()),
        }
    }

    /// Attach the raw response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw response body, if a response was received.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: format!("HTTP request failed: {err}"),
            status: err.status().map(|s| s.as_u16()),
            response_body: None,
        }
    }
}
