//! The network side of a chat session.
//!
//! [`PlantBackend`] is the seam the session talks through; [`HttpBackend`]
//! is the reqwest implementation used by the binary.

mod http;
#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;

use crate::api::{ChatRequest, ChatResponse, IdentifyResponse};
use crate::core::image::ImageUpload;

pub use http::HttpBackend;

/// The two remote operations a session depends on.
///
/// A server-reported `{"error": ...}` body is a successful call that
/// returns the `Failure` variant; `Err` is reserved for requests that never
/// produced a readable answer.
#[async_trait]
pub trait PlantBackend: Send + Sync {
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    async fn identify(&self, image: &ImageUpload) -> Result<IdentifyResponse, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Connection refused, DNS failure, timeout, or a body cut short.
    Transport(String),

    /// Non-2xx status whose body was not a recognizable error payload.
    Status { status: u16, body: String },

    /// 2xx status with a body that did not match the expected shape.
    Decode(String),

    /// The request could not be built (for example, an unparsable media type).
    Request(String),
}

impl BackendError {
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(detail) => write!(f, "Could not reach server: {detail}"),
            BackendError::Status { status, body } => {
                write!(f, "Server returned HTTP {status}: {body}")
            }
            BackendError::Decode(detail) => write!(f, "Unexpected response body: {detail}"),
            BackendError::Request(detail) => write!(f, "Could not build request: {detail}"),
        }
    }
}

impl StdError for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Transport("request timed out".to_string())
        } else if err.is_builder() {
            BackendError::Request(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}
