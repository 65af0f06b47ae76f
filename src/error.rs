//! Error types for tls-bridge crate.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a client or talking to the engine.
///
/// Per-request failures reported by the engine are not errors: they come back
/// as a [`Response`](crate::Response) with an error status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No shared library path was configured.
    #[error("A tls-client library path is required")]
    MissingLibraryPath,

    /// Host platform has no known shared library extension.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Library file does not exist or no file matched the discovery pattern.
    #[error("TLS client library not found: {0}")]
    LibraryNotFound(String),

    /// Dynamic loader rejected the library.
    #[error("Failed to load {}: {message}", .path.display())]
    LibraryLoad { path: PathBuf, message: String },

    /// Library loaded but does not export a required entry point.
    #[error("Missing engine symbol `{symbol}`: {message}")]
    MissingSymbol { symbol: &'static str, message: String },

    /// Foreign call could not be completed.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Body could not be decoded into the requested representation.
    #[error("Body decode error: {0}")]
    Decode(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Missing required field or data.
    #[error("Missing required: {0}")]
    Missing(String),
}

impl Error {
    /// Create an engine invocation error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Create a body decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create a library-not-found error.
    pub fn library_not_found(detail: impl Into<String>) -> Self {
        Self::LibraryNotFound(detail.into())
    }

    /// True for errors raised while constructing a client.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingLibraryPath
                | Self::UnsupportedPlatform(_)
                | Self::LibraryNotFound(_)
                | Self::LibraryLoad { .. }
                | Self::MissingSymbol { .. }
                | Self::UrlParse(_)
        )
    }
}
