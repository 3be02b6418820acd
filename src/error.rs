//! Error types for resound

use thiserror::Error;

/// Result type alias for resound operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for resound
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed container or header data
    #[error("Format error: {0}")]
    Format(String),

    /// Decoder-internal failure on otherwise recognized input
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoder-internal failure
    #[error("Encode error: {0}")]
    Encode(String),

    /// Feature or parameter combination the library does not handle
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No decoder is registered for the extension
    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),

    /// A load was attempted against a registry holding no decoders
    #[error("No decoders registered")]
    NoDecodersRegistered,

    /// Two decoders claimed the same extension at registry construction
    #[error("Duplicate extension registered: {0:?}")]
    DuplicateExtension(String),

    /// Decoder does not implement loading from a filesystem path
    #[error("Loading from a path is not implemented by the {0} decoder")]
    PathLoadNotImplemented(&'static str),

    /// Decoder does not implement loading from an in-memory buffer
    #[error("Loading from a buffer is not implemented by the {0} decoder")]
    BufferLoadNotImplemented(&'static str),
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Error::Decode(msg.into())
    }

    /// Create an encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Error::Encode(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }
}
