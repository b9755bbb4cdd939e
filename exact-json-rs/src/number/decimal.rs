//! Exact decimal representation of binary64 values.
//!
//! Every finite binary64 value is `m × 2^e` for integers `m` and `e`, and
//! therefore has a terminating decimal expansion. [`ExactDecimal`] holds that
//! expansion as `±coefficient × 10^exponent` with an arbitrary-precision
//! coefficient, so conversions in either direction never round.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;

use super::decode::decode_float;
use crate::error::{Error, Result};

/// An arbitrary-precision decimal `±coefficient × 10^exponent`.
///
/// Values are kept normalized: the coefficient carries no trailing zero
/// digits, and zero has exponent 0. The sign of zero is remembered (so that
/// `-0` survives [`to_f64`](Self::to_f64)) but ignored by equality.
#[derive(Debug, Clone)]
pub struct ExactDecimal {
    negative: bool,
    coefficient: BigUint,
    exponent: i64,
}

impl ExactDecimal {
    /// Positive zero.
    pub fn zero() -> Self {
        Self {
            negative: false,
            coefficient: BigUint::zero(),
            exponent: 0,
        }
    }

    /// Build a normalized decimal from its parts.
    pub fn new(negative: bool, coefficient: BigUint, exponent: i64) -> Self {
        let mut decimal = Self {
            negative,
            coefficient,
            exponent,
        };
        decimal.normalize();
        decimal
    }

    fn normalize(&mut self) {
        if self.coefficient.is_zero() {
            self.exponent = 0;
            return;
        }
        while (&self.coefficient % 10u32).is_zero() {
            self.coefficient /= 10u32;
            self.exponent = self.exponent.saturating_add(1);
        }
    }

    /// The decimal exactly equal to a finite binary64 value.
    pub fn from_f64(value: f64) -> Result<Self> {
        exact_decimal(value)
    }

    /// True for both signed zeros.
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// True for negative values, including `-0`.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Coefficient without trailing zeros.
    pub fn coefficient(&self) -> &BigUint {
        &self.coefficient
    }

    /// Power of ten applied to the coefficient.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Number of significant decimal digits (0 for zero).
    pub fn significant_digits(&self) -> usize {
        if self.is_zero() {
            0
        } else {
            self.coefficient.to_str_radix(10).len()
        }
    }

    /// Nearest binary64 value, rounding half to even.
    ///
    /// Magnitudes beyond the finite range become ±∞, magnitudes below half
    /// the smallest subnormal become ±0.
    pub fn to_f64(&self) -> Result<f64> {
        let sign = if self.negative { "-" } else { "" };
        let scientific = format!("{sign}{}e{}", self.coefficient, self.exponent);
        scientific.parse::<f64>().map_err(|_| Error::Grammar {
            offset: 0,
            expected: "decimal literal",
        })
    }

    /// Full decimal expansion without exponent notation.
    ///
    /// No trailing fractional zeros are emitted, and zero of either sign is
    /// formatted as `0`. The output length grows with `|exponent|`; decimals
    /// obtained from binary64 values stay below 1,100 characters.
    pub fn to_fixed(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let digits = self.coefficient.to_str_radix(10);
        let mut out = String::with_capacity(digits.len() + 2);
        if self.negative {
            out.push('-');
        }

        if self.exponent >= 0 {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(self.exponent.unsigned_abs() as usize));
            return out;
        }

        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            out.push_str(integer);
            out.push('.');
            out.push_str(fraction);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(scale - digits.len()));
            out.push_str(&digits);
        }
        out
    }
}

impl PartialEq for ExactDecimal {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() || other.is_zero() {
            return self.is_zero() && other.is_zero();
        }
        self.negative == other.negative
            && self.exponent == other.exponent
            && self.coefficient == other.coefficient
    }
}

impl Eq for ExactDecimal {}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed())
    }
}

impl FromStr for ExactDecimal {
    type Err = Error;

    /// Parse `-?digits(.digits)?([eE][-+]?digits)?` exactly.
    ///
    /// Exponents too large for `i64` saturate; such values are far outside
    /// the binary64 range either way.
    fn from_str(literal: &str) -> Result<Self> {
        let bytes = literal.as_bytes();
        let mut pos = 0;
        let invalid = |offset: usize| Error::Grammar {
            offset,
            expected: "decimal literal",
        };

        let negative = bytes.first() == Some(&b'-');
        if negative {
            pos += 1;
        }

        let integer_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == integer_start {
            return Err(invalid(pos));
        }
        let mut digits = String::with_capacity(literal.len());
        digits.push_str(&literal[integer_start..pos]);

        let mut fraction_len: i64 = 0;
        if bytes.get(pos) == Some(&b'.') {
            pos += 1;
            let fraction_start = pos;
            while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
            }
            if pos == fraction_start {
                return Err(invalid(pos));
            }
            digits.push_str(&literal[fraction_start..pos]);
            fraction_len = i64::try_from(pos - fraction_start).unwrap_or(i64::MAX);
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            pos += 1;
            let exponent_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            let exponent_start = pos;
            while let Some(&byte) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
                exponent = exponent
                    .saturating_mul(10)
                    .saturating_add(i64::from(byte - b'0'));
                pos += 1;
            }
            if pos == exponent_start {
                return Err(invalid(pos));
            }
            if exponent_negative {
                exponent = -exponent;
            }
        }

        if pos != bytes.len() {
            return Err(invalid(pos));
        }

        let trimmed = digits.trim_end_matches('0');
        let trailing_zeros = i64::try_from(digits.len() - trimmed.len()).unwrap_or(i64::MAX);
        let significant = trimmed.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self {
                negative,
                coefficient: BigUint::zero(),
                exponent: 0,
            });
        }

        let coefficient =
            BigUint::parse_bytes(significant.as_bytes(), 10).ok_or_else(|| invalid(0))?;
        let exponent = exponent
            .saturating_sub(fraction_len)
            .saturating_add(trailing_zeros);

        Ok(Self::new(negative, coefficient, exponent))
    }
}

/// The decimal exactly equal to a finite binary64 value.
///
/// With the decoded fields, a normal value is
/// `(−1)^sign × 2^(exponent−1023) × (1 + mantissa/2^52)` and a subnormal one
/// `(−1)^sign × 2^(1−1023) × (mantissa/2^52)`. Both are evaluated as the
/// integer significand times a power of two; a negative power `2^-k` is
/// carried as `5^k × 10^-k`.
pub fn exact_decimal(value: f64) -> Result<ExactDecimal> {
    if !value.is_finite() {
        return Err(Error::NonFinite(value.to_string()));
    }

    let decoded = decode_float(value)?;
    let negative = decoded.sign == 1;
    let mut significand = decoded.significand();
    if significand == 0 {
        return Ok(ExactDecimal {
            negative,
            coefficient: BigUint::zero(),
            exponent: 0,
        });
    }

    let mut power = decoded.binary_exponent();
    let shift = significand.trailing_zeros();
    significand >>= shift;
    power += shift as i32;

    let (coefficient, exponent) = if power >= 0 {
        (BigUint::from(significand) << power.unsigned_abs(), 0)
    } else {
        let five_power = BigUint::from(5u32).pow(power.unsigned_abs());
        (BigUint::from(significand) * five_power, i64::from(power))
    };

    Ok(ExactDecimal::new(negative, coefficient, exponent))
}
