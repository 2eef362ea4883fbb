//! Error types for snowrest-rs.
//!
//! This module defines domain-specific error types organized by functional area.

use thiserror::Error;

/// Top-level error type encompassing all possible errors.
#[derive(Error, Debug)]
pub enum SnowflakeError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication and token issuance errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Response decoding errors
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Statement lifecycle errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// HTTP transport errors
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised while validating client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required connection parameter was not supplied
    #[error("Missing required connection parameter '{parameter}'")]
    MissingParameter { parameter: String },

    /// A connection parameter was supplied but is unusable
    #[error("Invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },
}

/// Errors raised while issuing authentication tokens.
///
/// Authentication errors are fatal: the client never retries token issuance,
/// since a key that failed to sign once will fail again.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The private key material could not be loaded
    #[error("Unusable private key: {0}")]
    InvalidKey(String),

    /// Signing the token failed
    #[error("Failed to sign authentication token: {0}")]
    Signing(String),
}

/// Errors raised while decoding a server response body.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The server returned no body at all
    #[error("Empty response body from server")]
    EmptyResponse,

    /// The body could not be decompressed or parsed into a JSON object
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The server reported an application-level failure
    #[error("Server error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },
}

/// Errors raised during the statement lifecycle.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The service refused to accept the statement for execution
    #[error("Statement submission rejected (code {code}): {message}")]
    Submission { code: String, message: String },

    /// The service accepted the statement but returned no handle to poll
    #[error("Statement accepted but no statement handle was returned")]
    MissingHandle,

    /// Execution finished with a terminal failure code
    #[error("Statement execution failed (code {code}): {message}")]
    Failed { code: String, message: String },

    /// A success-coded response was missing a required field
    #[error("Malformed statement response: missing field '{field}'")]
    Protocol { field: String },
}

/// Errors raised by the HTTP transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be constructed
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

// Conversions from external error types
impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for SnowflakeError {
    fn from(err: reqwest::Error) -> Self {
        SnowflakeError::Transport(TransportError::Http(err))
    }
}
