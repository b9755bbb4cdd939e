//! exact-json - lossless JSON for binary64 numbers.
//!
//! Decoding accepts a numeric literal only when it denotes a binary64 value
//! exactly and rejects documents that repeat an object key. Encoding writes
//! every number as its complete decimal expansion (`-0` included), so that
//! decoding an encoded value always gives back the same bits.
//!
//! # Architecture
//!
//! - [`number`] - Bit decoding, exact decimal expansion, strict literal parsing
//! - [`json`] - Value model, combinator grammar and canonical encoder
//! - [`host`] - Dynamic host object model and its lowering to [`Value`]
//! - [`conformance`] - Corpus runner and differential harness against `serde_json`
//! - [`error`] - Error enum and its category taxonomy
//!
//! # Example
//!
//! ```
//! let value = exact_json::parse(r#"{"x": 0.1000000000000000055511151231257827021181583404541015625}"#).unwrap();
//! assert_eq!(value.get("x").and_then(|v| v.as_f64()), Some(0.1));
//!
//! let text = exact_json::stringify(&value).unwrap();
//! assert_eq!(exact_json::parse(&text).unwrap(), value);
//! ```

// Library code propagates errors; it must never abort the caller.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod conformance;
pub mod error;
pub mod host;
pub mod json;
pub mod number;

// Re-export commonly used types
pub use conformance::{CorpusRunner, DiffResult, DiffTestHarness};
pub use error::{Error, ErrorKind, Result};
pub use json::{
    parse, parse_bytes, parse_bytes_with_limits, parse_with_limits, stringify,
    stringify_with_limits, Limits, Map, Number, Value,
};
