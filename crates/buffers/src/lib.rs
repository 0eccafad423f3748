//! Byte stream primitives for the AMF wire codecs.
//!
//! The crate exposes a single [`ByteStream`]: a growable buffer with two
//! independent cursors, so one stream can serve as an append log for a
//! producer while a consumer reads the already-written prefix.

mod stream;

use thiserror::Error;

pub use stream::{ByteStream, DEFAULT_MARGIN};

/// Error type for byte stream operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The read cursor would pass the write cursor.
    #[error("unexpected end of stream")]
    EndOfStream,
    /// A length-delimited text run did not decode as UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// A value does not fit the encoding it was asked to use.
    #[error("{0}")]
    OutOfRange(String),
}
