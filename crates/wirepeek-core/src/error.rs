//! Error types for the wirepeek-core library.
//!
//! Every wire-level error describes input that does not look like protobuf
//! data at the level where it was raised. None of them are retryable: a parent
//! decode recovers by rendering the payload as a string or raw bytes instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wirepeek operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all wirepeek operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A varint, fixed-width value or length-delimited payload ran past the end of the input
    #[error("truncated input at offset {offset}")]
    TruncatedInput {
        /// Absolute byte offset where the read started
        offset: usize,
    },

    /// A varint did not terminate within 10 bytes or overflowed 64 bits
    #[error("varint overflows 64 bits at offset {offset}")]
    VarintOverflow {
        /// Absolute byte offset where the varint started
        offset: usize,
    },

    /// The field tag decoded to zero
    #[error("tag was zero at offset {offset}")]
    ZeroTag {
        /// Absolute byte offset of the tag
        offset: usize,
    },

    /// The field number is above the plausibility cap
    #[error("probably invalid key {number} at offset {offset}")]
    FieldNumberOutOfRange {
        /// The decoded field number
        number: u64,
        /// Absolute byte offset of the tag
        offset: usize,
    },

    /// A length prefix is above the plausibility cap
    #[error("probably invalid length {length} at offset {offset}")]
    LengthOutOfRange {
        /// The decoded length prefix
        length: u64,
        /// Absolute byte offset of the field tag
        offset: usize,
    },

    /// The tag selects a wire type the decoder does not handle
    #[error("invalid type {wire_type} at offset {offset}")]
    UnsupportedWireType {
        /// The raw wire type bits
        wire_type: u8,
        /// Absolute byte offset of the tag
        offset: usize,
    },

    /// Nested message decoding went deeper than the configured limit
    #[error("nesting depth {depth} exceeds the configured limit")]
    DepthLimitExceeded {
        /// Depth at which decoding was refused
        depth: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new truncated input error
    pub fn truncated(offset: usize) -> Self {
        Self::TruncatedInput { offset }
    }

    /// Creates a new varint overflow error
    pub fn varint_overflow(offset: usize) -> Self {
        Self::VarintOverflow { offset }
    }

    /// Returns the same error with its offset shifted by `base`.
    ///
    /// Low-level readers report offsets relative to the slice they were given.
    pub(crate) fn rebase(self, base: usize) -> Self {
        match self {
            Self::TruncatedInput { offset } => Self::TruncatedInput {
                offset: offset + base,
            },
            Self::VarintOverflow { offset } => Self::VarintOverflow {
                offset: offset + base,
            },
            other => other,
        }
    }

    /// Returns the absolute input offset this error refers to, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedInput { offset }
            | Self::VarintOverflow { offset }
            | Self::ZeroTag { offset }
            | Self::FieldNumberOutOfRange { offset, .. }
            | Self::LengthOutOfRange { offset, .. }
            | Self::UnsupportedWireType { offset, .. } => Some(*offset),
            Self::FileRead { .. } | Self::DepthLimitExceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FieldNumberOutOfRange {
            number: 2048,
            offset: 3,
        };
        assert_eq!(err.to_string(), "probably invalid key 2048 at offset 3");

        let err = Error::ZeroTag { offset: 0 };
        assert!(err.to_string().contains("tag was zero"));
    }

    #[test]
    fn test_offset() {
        assert_eq!(Error::DepthLimitExceeded { depth: 65 }.offset(), None);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(Error::file_read("/nope", io).offset(), None);
        assert_eq!(Error::LengthOutOfRange { length: 1, offset: 8 }.offset(), Some(8));
    }

    #[test]
    fn test_rebase_shifts_reader_offsets_only() {
        assert_eq!(Error::truncated(2).rebase(10).offset(), Some(12));
        assert_eq!(Error::varint_overflow(0).rebase(7).offset(), Some(7));
        assert_eq!(Error::ZeroTag { offset: 5 }.rebase(100).offset(), Some(5));
    }
}
