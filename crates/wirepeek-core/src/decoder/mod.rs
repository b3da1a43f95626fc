//! Schema-less decoding of protobuf-style wire data.
//!
//! ## Algorithm Overview
//!
//! 1. Read a tag varint and split it into field number and wire type
//! 2. Reject tags that are zero, carry a field number above 1024, or select
//!    a wire type other than 0, 1, 2 or 5
//! 3. Render the value according to the wire type:
//!    - varints are checked against two timestamp windows
//!    - fixed-width values are read six ways and the smallest plausible
//!      reading wins
//!    - length-delimited payloads are decoded recursively; if that fails they
//!      are shown as a string when valid UTF-8, and as hex otherwise
//! 4. Repeat until the input is exhausted or an error occurs
//!
//! Options are passed down every recursive call, so independent decodes can
//! run concurrently.

mod candidates;
mod format;
mod varint;
mod wire;

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, trace};

pub use candidates::{
    best_candidate, fixed32_candidates, fixed64_candidates, Candidate, PLAUSIBLE_MAGNITUDE,
};
pub use format::format_key;
pub use varint::{classify_varint, VarintClass, MICROSECOND_WINDOW, SECOND_WINDOW};
pub use wire::{decode_varint, Cursor, FieldKey, WireType, MAX_FIELD_NUMBER, MAX_LENGTH};

/// Default cap on speculative nested-message recursion
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Presentation and safety options for a decode
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Emit every candidate reading, not just the best guess
    pub show_all: bool,
    /// Annotate each key with its absolute byte offset
    pub show_offsets: bool,
    /// Deepest nested message the decoder will attempt
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            show_all: false,
            show_offsets: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Creates options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether every candidate reading is shown
    pub fn show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Sets whether byte offsets are shown
    pub fn show_offsets(mut self, show_offsets: bool) -> Self {
        self.show_offsets = show_offsets;
        self
    }

    /// Sets the nested message depth limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Outcome of one decode invocation.
///
/// `lines` holds everything rendered before `error` (if any) was hit.
#[derive(Debug, Default)]
pub struct DecodeReport {
    /// Number of fields decoded at this level
    pub fields: usize,
    /// Rendered output, nested fields already indented
    pub lines: Vec<String>,
    /// Why decoding stopped early, if it did
    pub error: Option<Error>,
}

impl DecodeReport {
    /// Returns true if the whole input was consumed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the report into its field count, lines and error
    pub fn into_parts(self) -> (usize, Vec<String>, Option<Error>) {
        (self.fields, self.lines, self.error)
    }

    /// All-or-nothing view: partial lines are dropped on error
    pub fn into_result(self) -> Result<(usize, Vec<String>)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.fields, self.lines)),
        }
    }
}

/// Interpretation chosen for a length-delimited payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// The payload decoded cleanly as zero or more fields
    Submessage(Vec<String>),
    /// Not a message, but valid UTF-8
    Text(&'a str),
    /// Neither
    RawBytes(&'a [u8]),
}

impl<'a> Payload<'a> {
    /// Tries a nested decode, then UTF-8, then falls back to raw bytes.
    ///
    /// `offset` is the absolute position of the payload's first byte and
    /// `depth` the depth of the message containing it.
    pub fn detect(payload: &'a [u8], offset: usize, depth: usize, options: &DecodeOptions) -> Self {
        let DecodeReport { lines, error, .. } = decode(payload, offset, depth + 1, options);

        let Some(err) = error else {
            return Payload::Submessage(lines);
        };
        trace!("Payload at {} is not a message: {}", offset, err);

        match std::str::from_utf8(payload) {
            Ok(text) => Payload::Text(text),
            Err(_) => Payload::RawBytes(payload),
        }
    }

    fn render(self, key: &str, out: &mut Vec<String>) {
        match self {
            Payload::Submessage(nested) => format::push_nested(key, nested, out),
            Payload::Text(text) => out.push(format::text_line(key, text)),
            Payload::RawBytes(bytes) => out.push(format::bytes_line(key, bytes)),
        }
    }
}

/// Decode `input` as a sequence of fields.
///
/// `base_offset` is the absolute position of `input[0]` and `depth` the
/// nesting level (0 for the top level). Decoding stops at the first error;
/// the report keeps whatever was rendered before it.
pub fn decode(
    input: &[u8],
    base_offset: usize,
    depth: usize,
    options: &DecodeOptions,
) -> DecodeReport {
    let mut report = DecodeReport::default();

    if depth > options.max_depth {
        report.error = Some(Error::DepthLimitExceeded { depth });
        return report;
    }

    let mut cursor = Cursor::new(input, base_offset);

    loop {
        match decode_field(&mut cursor, depth, options, &mut report.lines) {
            Ok(Some(key)) => {
                trace!(
                    "Decoded field {} ({:?}) at depth {}",
                    key.number,
                    key.wire_type,
                    depth
                );
                report.fields += 1;
            }
            Ok(None) => break,
            Err(err) => {
                report.error = Some(err);
                break;
            }
        }
    }

    report
}

/// Decode one field, returning `None` at a clean end of input
fn decode_field(
    cursor: &mut Cursor<'_>,
    depth: usize,
    options: &DecodeOptions,
    out: &mut Vec<String>,
) -> Result<Option<FieldKey>> {
    let offset = cursor.absolute_position();

    let Some(tag) = cursor.try_read_tag()? else {
        return Ok(None);
    };

    let key = FieldKey::from_tag(tag, offset)?;
    let label = format_key(key.number, offset, options.show_offsets);

    match key.wire_type {
        WireType::Varint => {
            let value = cursor.read_varint()?;
            render_varint(&label, value, options.show_all, out);
        }
        WireType::I64 => {
            let bytes = cursor.read_array::<8>()?;
            render_fixed(&label, &fixed64_candidates(bytes), options.show_all, out);
        }
        WireType::Len => {
            let length = cursor.read_varint()?;
            if length > MAX_LENGTH {
                return Err(Error::LengthOutOfRange { length, offset });
            }

            let payload_offset = cursor.absolute_position();
            let payload = cursor.read_slice(length as usize)?;
            Payload::detect(payload, payload_offset, depth, options).render(&label, out);
        }
        WireType::I32 => {
            let bytes = cursor.read_array::<4>()?;
            render_fixed(&label, &fixed32_candidates(bytes), options.show_all, out);
        }
    }

    Ok(Some(key))
}

fn render_varint(key: &str, value: u64, show_all: bool, out: &mut Vec<String>) {
    match classify_varint(value) {
        VarintClass::MicrosecondTimestamp(time) => {
            out.push(format::field_line(key, "varint, microseconds", time));
        }
        VarintClass::SecondTimestamp(time) => {
            out.push(format::field_line(key, "varint, milliseconds", time));
        }
        VarintClass::Integer => out.push(format::field_line(key, "varint", value)),
        VarintClass::Ambiguous if !show_all => {
            out.push(format::field_line(key, "varint", varint::dual_reading(value)));
        }
        VarintClass::Ambiguous => {}
    }

    if show_all {
        out.push(format::field_line(key, "varint", varint::dual_reading(value)));
    }
}

fn render_fixed(key: &str, candidates: &[Candidate], show_all: bool, out: &mut Vec<String>) {
    out.push(format::best_line(key, best_candidate(candidates)));

    if show_all {
        out.extend(format::candidate_lines(key, candidates));
    }
}

/// Primary decoder for wire data
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Creates a decoder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with custom options
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decode a complete top-level input
    pub fn decode(&self, data: &[u8]) -> DecodeReport {
        debug!("Starting decode of {} bytes", data.len());
        let report = decode(data, 0, 0, &self.options);

        match &report.error {
            None => debug!("Decode complete: {} fields", report.fields),
            Some(err) => debug!(
                "Decode stopped after {} fields: {}",
                report.fields, err
            ),
        }

        report
    }
}

/// Decode a buffer for an embedding host.
///
/// Any top-level error is returned as `Err` and partial output is dropped.
/// On success the lines are preceded by a `decoded N fields` header and a
/// blank line; an input with no fields yields no lines at all.
pub fn parse_buffer(data: &[u8], options: &DecodeOptions) -> Result<Vec<String>> {
    let (fields, lines) = Decoder::with_options(options.clone())
        .decode(data)
        .into_result()?;

    if fields == 0 {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("decoded {} fields", fields));
    out.push(String::new());
    out.extend(lines);
    Ok(out)
}

/// Read a file fully and decode it
pub fn decode_file(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<DecodeReport> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(Decoder::with_options(options.clone()).decode(&data))
}
