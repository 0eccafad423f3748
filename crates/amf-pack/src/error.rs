//! Codec error type.

use amf_buffers::StreamError;
use thiserror::Error;

/// Error type for AMF encode/decode operations.
///
/// Every variant is terminal for the operation that raised it: the session's
/// buffer state is no longer trustworthy and the whole message must be
/// treated as failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmfError {
    /// A value shape the active version cannot represent, or an
    /// unrecognized marker byte on read.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// A structural expectation failed during decode.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// A value exceeds an encodable range.
    #[error("range violation: {0}")]
    RangeViolation(String),
    /// Session construction with a version other than 0 or 3.
    #[error("unknown AMF version: {0}")]
    UnknownVersion(u8),
}

impl From<StreamError> for AmfError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::EndOfStream => {
                AmfError::ProtocolViolation("unexpected end of stream".to_owned())
            }
            StreamError::InvalidUtf8 => AmfError::ProtocolViolation("invalid UTF-8".to_owned()),
            StreamError::OutOfRange(msg) => AmfError::RangeViolation(msg),
        }
    }
}
