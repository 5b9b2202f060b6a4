//! Error types for llmsay
//!
//! Two families matter to callers: configuration failures, which are raised
//! before any request leaves the machine, and transport failures, which end
//! the current stream. Malformed payloads never surface here; the extractors
//! swallow them.

use thiserror::Error;

/// Main error type for llmsay
#[derive(Error, Debug)]
pub enum SayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model name missing from the routing table
    #[error("Unknown model: {model}")]
    UnknownModel { model: String },

    /// No credential stored for the provider
    #[error("No API key configured for provider '{provider}'. Run: llmsay configure -p {provider} -k <KEY>")]
    MissingCredential { provider: String },

    /// Provider answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection could not be established or the request not sent
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body failed mid-stream
    #[error("Streaming error: {0}")]
    Stream(String),

    /// A single SSE line exceeded the decoder's buffer limit
    #[error("SSE line of {len} bytes exceeds maximum {max}")]
    LineTooLong { len: usize, max: usize },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for llmsay operations
pub type Result<T> = std::result::Result<T, SayError>;

impl SayError {
    /// Raised before any network call; nothing was sent
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SayError::Config(_) | SayError::UnknownModel { .. } | SayError::MissingCredential { .. }
        )
    }

    /// Fatal to the current stream; partial output stays on the sink
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SayError::Status { .. }
                | SayError::Transport(_)
                | SayError::Stream(_)
                | SayError::LineTooLong { .. }
                | SayError::Http(_)
                | SayError::Io(_)
        )
    }
}

impl From<toml::de::Error> for SayError {
    fn from(err: toml::de::Error) -> Self {
        SayError::Config(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for SayError {
    fn from(err: toml::ser::Error) -> Self {
        SayError::Config(format!("Failed to serialize config: {}", err))
    }
}
