//! Client error type.
//!
//! `Display` output is shown to the viewer as-is.

use peptalk_common::PayloadError;
use thiserror::Error;

/// Errors raised while talking to the account API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Request never completed.
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response without a readable error body.
    #[error("Request failed with status {0}")]
    Status(u16),

    /// Body did not decode.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Server answered `ok: false` with this message.
    #[error("{0}")]
    Rejected(String),

    /// Payload decoded but failed validation.
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),

    /// Base URL did not parse.
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}
