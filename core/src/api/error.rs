//! Error types for query API calls

use thiserror::Error;

/// Errors talking to the query API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {path} failed")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("{path} returned a malformed response")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// True when the request ran past its deadline
    pub fn is_timeout(&self) -> bool {
        match self {
            ApiError::Request { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
