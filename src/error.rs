//! Error types for the broker.

use thiserror::Error;

/// Result alias for broker operations.
pub type Result<T> = std::result::Result<T, KraftletError>;

/// Failures while decoding wire or log bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer underflow: needed {needed} bytes, {available} available")]
    Underflow { needed: usize, available: usize },

    #[error("varint is longer than its maximum encoded width")]
    VarintTooLong,

    #[error("unexpected tagged fields marker {0:#04x}")]
    UnexpectedTaggedFields(u8),

    #[error("unexpected key marker {0:#04x}")]
    UnexpectedKeyMarker(u8),

    #[error("unexpected record header marker {0:#04x}")]
    UnexpectedHeaderMarker(u8),

    #[error("unexpected cursor byte {0:#04x}")]
    UnexpectedCursor(u8),

    #[error("unsupported request type {0}")]
    UnsupportedRequestType(i16),
}

/// Errors that can occur while serving requests.
#[derive(Error, Debug)]
pub enum KraftletError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: i64, max: usize },
}

impl KraftletError {
    /// True for lookup misses that handlers turn into protocol error codes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, KraftletError::NotFound(_))
    }
}
