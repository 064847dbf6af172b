use std::io;

use swfplace_amf3::serde::{Error as AmfError, Undecodable};
use thiserror::Error;

use crate::{Field, Version};

/// A record revision number outside of the PlaceObject2 to
/// PlaceObject4 family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unsupported placement record version {0}")]
pub struct UnsupportedVersion(pub u8);

/// Errors that may occur while decoding a placement record.
///
/// A failed decode never yields a partial record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    UnsupportedVersion(#[from] UnsupportedVersion),

    /// The flag word sets bits which the record revision does
    /// not define.
    #[error("flag bits {bits:#06x} are not defined for {version}")]
    MalformedFlags { version: Version, bits: u16 },

    /// The input ended in the middle of a field.
    #[error("truncated input: {0}")]
    TruncatedInput(#[from] io::Error),

    /// A string field is not valid UTF-8.
    #[error("{field} is not a valid UTF-8 string")]
    InvalidString { field: Field },

    /// A field violates the structure of its encoding.
    #[error("malformed {field}: {reason}")]
    MalformedField { field: Field, reason: &'static str },

    /// The embedded value is corrupt.
    #[error("embedded value: {0}")]
    Embedded(#[from] AmfError),
}

/// Errors that may occur while encoding a placement record.
///
/// A failed encode never writes any bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0}")]
    UnsupportedVersion(#[from] UnsupportedVersion),

    /// A populated field does not exist in the requested revision.
    #[error("{field} cannot be stored in {version}")]
    FieldNotLegal { field: Field, version: Version },

    /// A value does not fit into the encoding of its field.
    #[error("value of {field} is out of range for its encoding")]
    ValueOutOfRange { field: Field },

    /// The embedded value was captured from undecodable input and
    /// its structure is unknown.
    #[error("embedded value cannot be re-encoded: {reason}")]
    ReEncodeUnsupported { reason: Undecodable },

    /// The embedded value could not be serialized.
    #[error("embedded value: {0}")]
    Embedded(#[from] AmfError),

    #[error("{0}")]
    Io(#[from] io::Error),
}

// Bit field writes only fail when a value exceeds its width.
pub(crate) trait OutOfRange<T> {
    fn out_of_range(self, field: Field) -> Result<T, EncodeError>;
}

impl<T> OutOfRange<T> for io::Result<T> {
    #[inline]
    fn out_of_range(self, field: Field) -> Result<T, EncodeError> {
        self.map_err(|_| EncodeError::ValueOutOfRange { field })
    }
}
