//! # wirepeek-core
//!
//! A library for guessing the structure of protobuf-style binary data without a schema.
//!
//! This crate provides the core functionality for:
//! - Walking raw wire data as a sequence of (field number, wire type, value) tuples
//! - Recursively trying length-delimited values as nested messages
//! - Picking a best-guess rendering for ambiguous numeric values
//!
//! ## Architecture
//!
//! - [`decoder`]: Wire format reading, heuristics and line rendering
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use wirepeek_core::{DecodeOptions, Decoder};
//!
//! // Field 1 = 150, field 2 = { field 1 = 1 }
//! let data = [0x08, 0x96, 0x01, 0x12, 0x02, 0x08, 0x01];
//!
//! let report = Decoder::with_options(DecodeOptions::new()).decode(&data);
//! assert!(report.is_success());
//! assert_eq!(report.fields, 2);
//! assert_eq!(report.lines, ["1: (varint) 150", "2: {", "  1: (varint) 1", "}"]);
//! ```
//!
//! The decoder never performs I/O itself and keeps no global state, so
//! separate inputs can be decoded on separate threads.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decoder;
pub mod error;

// Re-export primary types for convenience
pub use decoder::{decode, decode_file, parse_buffer, DecodeOptions, DecodeReport, Decoder, Payload};
pub use error::{Error, Result};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
