//! Error types for the AList API client.
//!
//! # Design
//! Every operation fails with exactly one `ApiError`, and the four variants
//! never overlap:
//!
//! - `Transport`: no HTTP status is known (encoding, connection, timeout).
//! - `Protocol`: the server answered with an HTTP status other than 200.
//! - `Decode`: the body is not the JSON shape the operation expects.
//! - `Api`: the envelope carried a `code` other than 200.
//!
//! Only `Api` depends on the server's business logic, so it keeps the remote
//! code and message verbatim for callers to branch on.

use thiserror::Error;

/// Failures that happen before any HTTP status is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The round-trip did not finish within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Io(String),
}

/// Errors returned by `AlistClient` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-200 HTTP status. The body was not decoded.
    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The envelope `code` was not 200.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl ApiError {
    /// The remote envelope code, if this is an application-level rejection.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            ApiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Protocol { .. } => "protocol",
            ApiError::Decode(_) => "decode",
            ApiError::Api { .. } => "api",
        }
    }
}

/// Errors raised while loading `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
