//! Error handling for exact-json.
//!
//! Every failure is terminal for the enclosing `parse` or `stringify` call:
//! the first violation aborts the operation and no partial result is
//! returned. Variants carry the offending key, index, literal or offset so
//! callers can act on them.
//!
//! Variants are grouped into a small taxonomy through [`ErrorKind`], which is
//! what the CLI and the conformance corpus report.

use thiserror::Error;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input of the wrong kind (NaN, non-finite numbers, invalid UTF-8,
    /// values that have no JSON encoding).
    InputType,
    /// Syntax violation, including trailing unconsumed input.
    Grammar,
    /// Repeated object key.
    DuplicateKey,
    /// Numeric literal or value not exactly representable.
    PrecisionLoss,
    /// Magnitude or size beyond what can be represented or is allowed.
    Range,
    /// Value impersonating an array or a plain object.
    StructuralFraud,
    /// Missing, extra or ill-configured property.
    PropertyDescriptor,
}

impl ErrorKind {
    /// Stable name of the category.
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorKind::InputType => "InputType",
            ErrorKind::Grammar => "Grammar",
            ErrorKind::DuplicateKey => "DuplicateKey",
            ErrorKind::PrecisionLoss => "PrecisionLoss",
            ErrorKind::Range => "Range",
            ErrorKind::StructuralFraud => "StructuralFraud",
            ErrorKind::PropertyDescriptor => "PropertyDescriptor",
        }
    }

    /// Look a category up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "InputType" => ErrorKind::InputType,
            "Grammar" => ErrorKind::Grammar,
            "DuplicateKey" => ErrorKind::DuplicateKey,
            "PrecisionLoss" => ErrorKind::PrecisionLoss,
            "Range" => ErrorKind::Range,
            "StructuralFraud" => ErrorKind::StructuralFraud,
            "PropertyDescriptor" => ErrorKind::PropertyDescriptor,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All errors produced by exact-json.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Input type
    /// NaN has no sign/exponent/mantissa decomposition of interest.
    #[error("Will not attempt to get the sign, exponent and mantissa of NaN")]
    NotANumber,
    /// NaN or an infinity where a finite number is required.
    #[error("Cannot get an exact decimal for non-finite number {0}")]
    NonFinite(String),
    /// Byte input that is not valid UTF-8.
    #[error("Can't parse non-text input: invalid UTF-8 at byte {0}")]
    InvalidUtf8(usize),
    /// A value with no JSON encoding (undefined, symbol, function, ...).
    #[error("Cannot stringify {0}")]
    Unstringifiable(String),
    /// An object that has been made non-extensible.
    #[error("Can't stringify a non-extensible object")]
    NonExtensible,

    // Grammar
    /// The input does not match the JSON grammar.
    #[error("Invalid JSON at offset {offset}: expected {expected}")]
    Grammar {
        /// Byte offset of the furthest failure.
        offset: usize,
        /// What the grammar expected there.
        expected: &'static str,
    },
    /// Input remains after the top-level value.
    #[error("Invalid JSON at offset {offset}: unexpected trailing input")]
    TrailingInput {
        /// Byte offset of the first unconsumed byte.
        offset: usize,
    },
    /// A `\u` escape encodes a surrogate without its partner.
    #[error("Invalid JSON at offset {offset}: unpaired surrogate escape")]
    UnpairedSurrogate {
        /// Byte offset of the opening quote of the string.
        offset: usize,
    },

    // Duplicate key
    /// An object key appears twice.
    #[error("Duplicate key {0}")]
    DuplicateKey(String),

    // Precision loss
    /// A literal has no exact binary64 representation.
    #[error("Number {literal} cannot be precisely represented as a binary64 value; the closest we can get is {closest}")]
    PrecisionLoss {
        /// The literal as written.
        literal: String,
        /// Exact decimal expansion of the nearest binary64 value.
        closest: String,
    },

    // Range
    /// A literal whose magnitude overflows binary64.
    #[error("Number {literal} is too large to be precisely represented as a binary64 value")]
    NumberOutOfRange {
        /// The literal as written.
        literal: String,
    },
    /// A number literal longer than the configured limit.
    #[error("Number literal of {0} bytes exceeds limit {1}")]
    NumberTooLong(u64, u64),
    /// Arrays/objects nested deeper than the configured limit.
    #[error("Nesting depth {0} exceeds limit {1}")]
    NestingTooDeep(u64, u64),
    /// Input larger than the configured limit.
    #[error("Input of {0} bytes exceeds limit {1}")]
    InputTooLarge(u64, u64),
    /// A decoded string longer than the configured limit.
    #[error("String of {0} bytes exceeds limit {1}")]
    StringTooLong(u64, u64),
    /// An object with more fields than the configured limit.
    #[error("Object with {0} fields exceeds limit {1}")]
    TooManyFields(u64, u64),
    /// An array with more elements than the configured limit.
    #[error("Array with {0} elements exceeds limit {1}")]
    ArrayTooLong(u64, u64),

    // Structural fraud
    /// Array prototype on something that is not intrinsically an array.
    #[error("Can't stringify a non-array with prototype Array.prototype")]
    ImitationArray,
    /// Object prototype on something that is not a plain object.
    #[error("Can't stringify a non-plain object with prototype Object.prototype")]
    ImitationObject,

    // Property descriptor
    /// An own property keyed by a symbol.
    #[error("Can't stringify a value with symbol property {0}")]
    SymbolProperty(String),
    /// A hole in an array.
    #[error("Can't stringify array with missing entry: {0}")]
    MissingEntry(u64),
    /// A non-index own property on an array.
    #[error("Can't stringify array with extra property: {0}")]
    ExtraProperty(String),
    /// A getter/setter property.
    #[error("Can't stringify a value with accessor property {0}")]
    AccessorProperty(String),
    /// A property hidden from enumeration.
    #[error("Can't stringify a value with non-enumerable property {0}")]
    NonEnumerableProperty(String),
    /// A non-writable property.
    #[error("Can't stringify a value with read-only property {0}")]
    ReadOnlyProperty(String),
    /// A non-configurable property.
    #[error("Can't stringify a value with non-configurable property {0}")]
    NonConfigurableProperty(String),
}

impl Error {
    /// Category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::NotANumber
            | Error::NonFinite(_)
            | Error::InvalidUtf8(_)
            | Error::Unstringifiable(_)
            | Error::NonExtensible => ErrorKind::InputType,
            Error::Grammar { .. } | Error::TrailingInput { .. } | Error::UnpairedSurrogate { .. } => {
                ErrorKind::Grammar
            }
            Error::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Error::PrecisionLoss { .. } => ErrorKind::PrecisionLoss,
            Error::NumberOutOfRange { .. }
            | Error::NumberTooLong(..)
            | Error::NestingTooDeep(..)
            | Error::InputTooLarge(..)
            | Error::StringTooLong(..)
            | Error::TooManyFields(..)
            | Error::ArrayTooLong(..) => ErrorKind::Range,
            Error::ImitationArray | Error::ImitationObject => ErrorKind::StructuralFraud,
            Error::SymbolProperty(_)
            | Error::MissingEntry(_)
            | Error::ExtraProperty(_)
            | Error::AccessorProperty(_)
            | Error::NonEnumerableProperty(_)
            | Error::ReadOnlyProperty(_)
            | Error::NonConfigurableProperty(_) => ErrorKind::PropertyDescriptor,
        }
    }
}

/// Result type for exact-json operations.
pub type Result<T> = std::result::Result<T, Error>;
