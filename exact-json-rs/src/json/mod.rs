//! Exact JSON parsing and encoding.
//!
//! Parsing accepts a number only when the literal denotes a binary64 value
//! exactly, and rejects repeated object keys. Encoding writes every number
//! as its full decimal expansion, so `parse(stringify(v)) == v` for every
//! value `v` that can be encoded.
//!
//! # Architecture
//!
//! - [`types`] - Core JSON value types
//! - [`limits`] - Resource limits
//! - [`combinator`] - Parser combinator primitives
//! - [`grammar`] - JSON productions over the combinators
//! - [`stringify`] - Canonical exact-precision encoder
//!
//! # Example
//!
//! ```
//! use exact_json::json::{parse, stringify};
//!
//! let value = parse("[0.5, -0]").unwrap();
//! assert_eq!(stringify(&value).unwrap(), "[0.5,-0]");
//!
//! // 0.1 has no exact binary64 representation
//! assert!(parse("0.1").is_err());
//! ```

pub mod combinator;
pub mod grammar;
pub mod limits;
pub mod stringify;
pub mod types;

// Re-export commonly used items
pub use grammar::{parse, parse_bytes, parse_bytes_with_limits, parse_with_limits};
pub use limits::Limits;
pub use stringify::{is_canonical, stringify, stringify_with_limits};
pub use types::{Map, Number, Value};
