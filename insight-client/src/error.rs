//! Error types for the dashboard client

use thiserror::Error;

/// Failures talking to insight-server
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, timeout, or other transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Server answered 2xx but flagged `success: false`
    #[error("Request was not successful: {0}")]
    Unsuccessful(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// The server could not be reached at all (as opposed to answering badly)
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
