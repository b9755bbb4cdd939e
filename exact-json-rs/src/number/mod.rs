//! Exact binary64 ↔ decimal conversion.
//!
//! - [`decode`] - sign/exponent/mantissa extraction
//! - [`decimal`] - arbitrary-precision decimals equal to binary64 values
//! - [`strict`] - literal parsing that refuses to round

pub mod decimal;
pub mod decode;
pub mod strict;

pub use decimal::{exact_decimal, ExactDecimal};
pub use decode::{decode_float, DecodedFloat};
pub use strict::strict_parse_f64;
