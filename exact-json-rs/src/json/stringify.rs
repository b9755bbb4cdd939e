//! Canonical exact-precision encoding.
//!
//! Output has no insignificant whitespace, keeps object insertion order, and
//! writes every number as its full decimal expansion: `0.1` becomes
//! `0.1000000000000000055511151231257827021181583404541015625` and `1e21`
//! becomes `1000000000000000000000`. Negative zero is written `-0`.
//!
//! Traversal uses an explicit stack, so depth is bounded by
//! [`Limits::max_nesting_depth`] rather than by the call stack.

use std::slice;

use indexmap::map;

use super::limits::Limits;
use super::types::{Number, Value};
use crate::error::{Error, Result};
use crate::number::exact_decimal;

/// An open array or object and the children not yet written.
enum Frame<'v> {
    Array {
        items: slice::Iter<'v, Value>,
        first: bool,
    },
    Object {
        entries: map::Iter<'v, String, Value>,
        first: bool,
    },
}

/// Encode a value with default limits.
pub fn stringify(value: &Value) -> Result<String> {
    stringify_with_limits(value, Limits::default())
}

/// Encode a value with custom limits.
pub fn stringify_with_limits(value: &Value, limits: Limits) -> Result<String> {
    let max_depth = limits.max_nesting_depth;
    let mut output = String::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut next = Some(value);

    loop {
        if let Some(value) = next.take() {
            match value {
                Value::Array(items) => {
                    check_depth(stack.len(), max_depth)?;
                    output.push('[');
                    stack.push(Frame::Array {
                        items: items.iter(),
                        first: true,
                    });
                }
                Value::Object(entries) => {
                    check_depth(stack.len(), max_depth)?;
                    output.push('{');
                    stack.push(Frame::Object {
                        entries: entries.iter(),
                        first: true,
                    });
                }
                Value::Null => output.push_str("null"),
                Value::Bool(true) => output.push_str("true"),
                Value::Bool(false) => output.push_str("false"),
                Value::Number(number) => serialize_number(*number, &mut output)?,
                Value::String(s) => serialize_string(s, &mut output),
            }
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        match frame {
            Frame::Array { items, first } => match items.next() {
                Some(item) => {
                    if !std::mem::take(first) {
                        output.push(',');
                    }
                    next = Some(item);
                }
                None => {
                    output.push(']');
                    stack.pop();
                }
            },
            Frame::Object { entries, first } => match entries.next() {
                Some((key, item)) => {
                    if !std::mem::take(first) {
                        output.push(',');
                    }
                    serialize_string(key, &mut output);
                    output.push(':');
                    next = Some(item);
                }
                None => {
                    output.push('}');
                    stack.pop();
                }
            },
        }
    }

    tracing::trace!(bytes = output.len(), "stringified value");
    Ok(output)
}

fn check_depth(open: usize, max_depth: u64) -> Result<()> {
    let depth = open as u64 + 1;
    if depth > max_depth {
        return Err(Error::NestingTooDeep(depth, max_depth));
    }
    Ok(())
}

/// Write a number as its full decimal expansion.
pub fn serialize_number(number: Number, output: &mut String) -> Result<()> {
    if number.is_negative_zero() {
        output.push_str("-0");
        return Ok(());
    }
    output.push_str(&exact_decimal(number.as_f64())?.to_fixed());
    Ok(())
}

/// Write a string with JSON escaping.
pub fn serialize_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c < '\x20' => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
    output.push('"');
}

/// True if `text` is exactly the canonical encoding of `value`.
pub fn is_canonical(text: &str, value: &Value) -> bool {
    stringify(value).is_ok_and(|canonical| canonical == text)
}
