//! Bit-level decomposition of binary64 values.

use crate::error::{Error, Result};

/// Exponent bias of the binary64 format.
pub const EXPONENT_BIAS: i32 = 1023;

/// Number of explicitly stored mantissa bits.
pub const MANTISSA_BITS: u32 = 52;

/// Exponent field value shared by the infinities and NaN.
pub const MAX_EXPONENT: u16 = 0b111_1111_1111;

/// Raw fields of a binary64 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedFloat {
    /// 0 for positive, 1 for negative (including -0).
    pub sign: u8,
    /// Biased 11-bit exponent field.
    pub exponent: u16,
    /// 52-bit fraction field, without the implicit leading 1.
    pub mantissa: u64,
}

impl DecodedFloat {
    /// Exponent field is zero: a subnormal or a zero.
    pub fn is_subnormal(&self) -> bool {
        self.exponent == 0
    }

    /// ±Infinity.
    pub fn is_infinite(&self) -> bool {
        self.exponent == MAX_EXPONENT && self.mantissa == 0
    }

    /// Integer significand, with the implicit leading 1 restored for
    /// normal values.
    pub fn significand(&self) -> u64 {
        if self.is_subnormal() {
            self.mantissa
        } else {
            self.mantissa + (1 << MANTISSA_BITS)
        }
    }

    /// Power of two applied to [`significand`](Self::significand).
    ///
    /// Subnormals use an exponent field of 1 instead of 0, so that
    /// `significand() * 2^binary_exponent()` is the value for every finite
    /// input.
    pub fn binary_exponent(&self) -> i32 {
        let field = if self.is_subnormal() { 1 } else { i32::from(self.exponent) };
        field - EXPONENT_BIAS - MANTISSA_BITS as i32
    }

    /// Reassemble the binary64 value.
    pub fn to_f64(&self) -> f64 {
        let bits = (u64::from(self.sign) << 63)
            | (u64::from(self.exponent) << MANTISSA_BITS)
            | self.mantissa;
        f64::from_bits(bits)
    }
}

/// Extract sign, exponent and mantissa from a binary64 value.
///
/// Infinities decode normally; NaN is rejected.
pub fn decode_float(value: f64) -> Result<DecodedFloat> {
    if value.is_nan() {
        return Err(Error::NotANumber);
    }

    let bytes = value.to_le_bytes();

    let sign = (bytes[7] & 0b1000_0000) >> 7;
    let exponent =
        (u16::from(bytes[7] & 0b0111_1111) << 4) + u16::from((bytes[6] & 0b1111_0000) >> 4);

    // Weighted sum of the low nibble of byte 6 and bytes 5..=0.
    let mantissa = bytes[..6]
        .iter()
        .rev()
        .fold(u64::from(bytes[6] & 0b0000_1111), |acc, &byte| {
            acc * 256 + u64::from(byte)
        });

    Ok(DecodedFloat {
        sign,
        exponent,
        mantissa,
    })
}
