//! JSON value types.
//!
//! [`Value`] is a closed sum type: anything that reaches the encoder as a
//! `Value` is already known to be plain JSON data, so encoding needs no
//! runtime type inspection.
//!
//! - Numbers are binary64 values that never hold NaN; `+0` and `-0` are
//!   distinct.
//! - Objects keep insertion order and have unique keys.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Insertion-ordered JSON object.
pub type Map = IndexMap<String, Value>;

/// A binary64 value that is never NaN.
///
/// Equality and hashing are bitwise, so `Number(0.0) != Number(-0.0)`.
#[derive(Debug, Clone, Copy)]
pub struct Number(f64);

impl Number {
    /// Wrap a binary64 value, rejecting NaN.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Err(Error::NotANumber);
        }
        Ok(Self(value))
    }

    /// The wrapped value.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// True for `-0`.
    pub fn is_negative_zero(self) -> bool {
        self.0 == 0.0 && self.0.is_sign_negative()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl std::hash::Hash for Number {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Number {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Number> for f64 {
    fn from(number: Number) -> Self {
        number.0
    }
}

macro_rules! number_from_exact {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self(f64::from(value))
                }
            }
        )*
    };
}

number_from_exact!(i8, i16, i32, u8, u16, u32);

impl TryFrom<f32> for Number {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(f64::from(value))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A JSON value.
///
/// Values are immutable once built; the parser constructs them bottom-up and
/// the encoder only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// JSON null literal
    #[default]
    Null,
    /// JSON boolean (true/false)
    Bool(bool),
    /// JSON number
    Number(Number),
    /// JSON string
    String(String),
    /// JSON array of values
    Array(Vec<Value>),
    /// JSON object with insertion-ordered unique keys
    Object(Map),
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is a boolean value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns true if this is a number value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true if this is an array value.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns true if this is an object value.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the boolean value if this is a Bool, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the binary64 value if this is a Number, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the array if this is an Array, None otherwise.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a reference to the object if this is an Object, None otherwise.
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get a value from an object by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Get a value from an array by index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    /// Returns the type name as a string for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

impl TryFrom<f64> for Value {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Number::new(value).map(Value::Number)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert!(Value::Null.is_null());
        assert!(Value::Bool(true).is_bool());
        assert!(Value::from(Number::from(42)).is_number());
        assert!(Value::from("test").is_string());
        assert!(Value::Array(vec![]).is_array());
        assert!(Value::Object(Map::new()).is_object());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from(Number::from(42)).as_f64(), Some(42.0));
        assert_eq!(Value::from("test").as_str(), Some("test"));
        assert_eq!(Value::Null.as_str(), None);
    }

    #[test]
    fn test_nan_never_stored() {
        assert_eq!(Number::new(f64::NAN), Err(Error::NotANumber));
        assert!(Value::try_from(f64::NAN).is_err());
        assert!(Number::new(f64::INFINITY).is_ok());
    }

    #[test]
    fn test_single_precision_nan_rejected() {
        assert_eq!(Number::try_from(f32::NAN), Err(Error::NotANumber));
        assert_eq!(Number::try_from(0.1f32).unwrap().as_f64(), f64::from(0.1f32));
        assert!(Number::try_from(-0.0f32).unwrap().is_negative_zero());
    }

    #[test]
    fn test_signed_zeros_distinct() {
        let positive = Value::try_from(0.0).unwrap();
        let negative = Value::try_from(-0.0).unwrap();
        assert_ne!(positive, negative);
        assert!(Number::new(-0.0).unwrap().is_negative_zero());
        assert!(!Number::new(0.0).unwrap().is_negative_zero());
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let value: Value = [
            ("b".to_string(), Value::Null),
            ("a".to_string(), Value::Bool(true)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(false).type_name(), "boolean");
        assert_eq!(Value::from(Number::from(0)).type_name(), "number");
        assert_eq!(Value::String(String::new()).type_name(), "string");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
        assert_eq!(Value::Object(Map::new()).type_name(), "object");
    }
}
