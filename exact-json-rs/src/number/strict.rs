//! Strict decimal-literal parsing.
//!
//! A literal is accepted only when some binary64 value equals it exactly.
//! `0.1` is therefore rejected, while its exact expansion
//! `0.1000000000000000055511151231257827021181583404541015625` is accepted.

use super::decimal::{exact_decimal, ExactDecimal};
use crate::error::{Error, Result};

/// Parse a decimal literal to the binary64 value it denotes exactly.
///
/// Fails with [`Error::NumberOutOfRange`] when the nearest binary64 value is
/// infinite and with [`Error::PrecisionLoss`] when it differs from the
/// literal. `-0` parses to negative zero.
pub fn strict_parse_f64(literal: &str) -> Result<f64> {
    let exact: ExactDecimal = literal.parse()?;
    let nearest = exact.to_f64()?;

    if !nearest.is_finite() {
        return Err(Error::NumberOutOfRange {
            literal: literal.to_string(),
        });
    }

    let closest = exact_decimal(nearest)?;
    if closest != exact {
        tracing::debug!(literal, "rejecting inexact literal");
        return Err(Error::PrecisionLoss {
            literal: literal.to_string(),
            closest: closest.to_fixed(),
        });
    }

    Ok(nearest)
}
