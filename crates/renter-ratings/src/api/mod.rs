//! HTTP access to the marketplace backend.

mod client;

pub use client::BackendClient;

/// Failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unable to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid session cookie header")]
    InvalidCookie,
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status for server-side rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
