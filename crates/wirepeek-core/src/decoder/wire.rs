//! Low-level protobuf wire format reading.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types handled here:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields)
//! - 5: I32 (fixed32, sfixed32, float)
//!
//! Groups (3 and 4) are deprecated and treated as malformed input.

use crate::error::{Error, Result};

/// Largest field number accepted before the data is considered noise.
///
/// This is a plausibility guard tuned for real captures, not a protocol
/// limit (the protocol allows up to 2^29 - 1).
pub const MAX_FIELD_NUMBER: u64 = 1024;

/// Largest length prefix accepted for a length-delimited field.
pub const MAX_LENGTH: u64 = 32 * 1024;

/// A 64-bit varint never needs more than 10 bytes
const MAX_VARINT_LEN: usize = 10;

/// Protobuf wire types understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    I64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Len = 2,
    /// 32-bit fixed-width
    I32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::I32),
            _ => Err(Error::UnsupportedWireType {
                wire_type: value,
                offset: 0,
            }),
        }
    }
}

/// Decode a varint from the given bytes.
///
/// Returns the decoded value and the number of bytes consumed. Error offsets
/// are relative to `data`.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;

    for (i, &byte) in data.iter().enumerate() {
        // The tenth byte may only carry the single remaining bit
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(Error::varint_overflow(0));
        }

        result |= u64::from(byte & 0x7F) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(Error::truncated(0))
}

/// Field number and wire type decoded from a tag varint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    /// Field number (`tag >> 3`)
    pub number: u64,
    /// Wire type (low three bits of the tag)
    pub wire_type: WireType,
}

impl FieldKey {
    /// Validate a raw tag read at absolute `offset`.
    pub fn from_tag(tag: u64, offset: usize) -> Result<Self> {
        if tag == 0 {
            return Err(Error::ZeroTag { offset });
        }

        let number = tag >> 3;
        if number > MAX_FIELD_NUMBER {
            return Err(Error::FieldNumberOutOfRange { number, offset });
        }

        // Three-bit mask: wire types 3, 4, 6 and 7 (e.g. tags 0x0B, 0x0C,
        // 0x0E, 0x0F) are rejected rather than aliased onto 0..=2
        let wire_type = WireType::try_from((tag & 0x07) as u8).map_err(|_| {
            Error::UnsupportedWireType {
                wire_type: (tag & 0x07) as u8,
                offset,
            }
        })?;

        Ok(Self { number, wire_type })
    }
}

/// Forward-only read position over an immutable buffer.
///
/// `base` is the absolute offset of `data[0]` within the top-level input, so
/// nested cursors report positions the user can find in the original bytes.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `data`
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            position: 0,
            base,
        }
    }

    /// Position relative to the start of this cursor's buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Position relative to the start of the top-level input
    pub fn absolute_position(&self) -> usize {
        self.base + self.position
    }

    /// Returns true once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Reads one varint
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.absolute_position();
        let (value, len) = decode_varint(self.rest()).map_err(|e| e.rebase(start))?;
        self.position += len;
        Ok(value)
    }

    /// Reads a field tag, returning `None` on a clean end of input.
    pub fn try_read_tag(&mut self) -> Result<Option<u64>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.read_varint().map(Some)
    }

    /// Reads exactly `len` bytes
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let rest = self.rest();
        if rest.len() < len {
            return Err(Error::truncated(self.absolute_position()));
        }
        self.position += len;
        Ok(&rest[..len])
    }

    /// Reads exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }
}
