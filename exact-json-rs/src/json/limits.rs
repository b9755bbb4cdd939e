//! Resource limits for parsing and stringifying.
//!
//! Limits are an explicit value passed to
//! [`parse_with_limits`](super::parse_with_limits) and
//! [`stringify_with_limits`](super::stringify_with_limits); there is no
//! process-wide setting.
//!
//! # Checked bounds
//!
//! - total input size
//! - nesting depth of arrays/objects
//! - decoded string length
//! - number literal length
//! - object field count
//! - array length

use serde::Deserialize;

/// Longest literal needed to write any binary64 value in full: the smallest
/// subnormal expands to `0.` followed by 1,074 fractional digits.
pub const LONGEST_EXACT_LITERAL: u64 = 1_077;

/// Resource limits.
///
/// Deserializes from JSON with every field optional; missing fields take the
/// [`standard`](Self::standard) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum total input size in bytes
    pub max_input_size: u64,
    /// Maximum nesting depth for arrays/objects
    pub max_nesting_depth: u64,
    /// Maximum decoded string length in bytes
    pub max_string_length: u64,
    /// Maximum number literal length in bytes
    pub max_number_length: u64,
    /// Maximum number of fields in an object
    pub max_object_fields: u64,
    /// Maximum number of elements in an array
    pub max_array_length: u64,
}

impl Limits {
    /// Default limits.
    pub const fn standard() -> Self {
        Self {
            max_input_size: 8 * 1024 * 1024,  // 8 MiB
            max_nesting_depth: 128,           // 128 levels
            max_string_length: 1024 * 1024,   // 1 MiB
            max_number_length: 2 * 1024,      // 2 KiB
            max_object_fields: 10_000,        // 10,000 fields
            max_array_length: 1_000_000,      // 1,000,000 elements
        }
    }

    /// Generous limits for trusted input.
    pub const fn lenient() -> Self {
        Self {
            max_input_size: 256 * 1024 * 1024, // 256 MiB
            max_nesting_depth: 1024,           // 1024 levels
            max_string_length: 64 * 1024 * 1024, // 64 MiB
            max_number_length: 64 * 1024,      // 64 KiB
            max_object_fields: 1_000_000,      // 1,000,000 fields
            max_array_length: 16_000_000,      // 16,000,000 elements
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::standard()
    }
}
