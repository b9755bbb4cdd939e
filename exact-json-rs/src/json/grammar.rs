//! JSON grammar.
//!
//! Productions are built from [`combinator`](super::combinator) primitives:
//!
//! ```text
//! document = ws value ws
//! value    = object | array | string | number | "true" | "false" | "null"
//! object   = "{" ws (string ws ":" ws value ws) % ("," ws) "}"
//! array    = "[" ws (value ws) % ("," ws) "]"
//! string   = '"' (unescaped | "\" escape)* '"'
//! number   = -?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?
//! ws       = [ \n\r\t]*
//! ```
//!
//! Repeated keys, inexact numbers and limit violations abort the parse.
//! Containers are parsed without recursion, so only `max_nesting_depth`
//! bounds how deep a document may go.

use std::sync::LazyLock;

use regex::Regex;

use super::combinator::{
    alt, filter, label, literal, many, map, map_res, opt, pattern, scalar, seq, Failure, Input,
    PResult, Parser,
};
use super::limits::Limits;
use super::types::{Map, Number, Value};
use crate::error::{Error, Result};
use crate::number::strict_parse_f64;

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[ \n\r\t]*").expect("valid whitespace pattern"));

#[allow(clippy::expect_used)]
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?")
        .expect("valid number pattern")
});

#[allow(clippy::expect_used)]
static UNICODE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\Au[0-9a-fA-F]{4}").expect("valid escape pattern"));

/// One decoded piece of a string literal.
enum Piece {
    Scalar(char),
    /// UTF-16 code unit from a `\uXXXX` escape; may be half a surrogate pair.
    Unit(u16),
}

fn ws<'a>(input: Input<'a>) -> PResult<'a, &'a str> {
    pattern(&WHITESPACE, "whitespace").parse(input)
}

fn comma<'a>(input: Input<'a>) -> PResult<'a, (&'a str, &'a str)> {
    seq((literal(","), ws)).parse(input)
}

/// An array or object whose closing bracket has not been reached yet.
enum Frame {
    Array(Vec<Value>),
    /// Members so far and the key of the member being parsed.
    Object(Map, String),
}

/// How a value begins: complete, or an opening bracket.
enum Start {
    Leaf(Value),
    Array,
    Object,
}

fn start<'a>(input: Input<'a>) -> PResult<'a, Start> {
    label(
        alt((
            map(literal("{"), |_| Start::Object),
            map(literal("["), |_| Start::Array),
            map(string, |s| Start::Leaf(Value::String(s))),
            map(number, Start::Leaf),
            map(literal("true"), |_| Start::Leaf(Value::Bool(true))),
            map(literal("false"), |_| Start::Leaf(Value::Bool(false))),
            map(literal("null"), |_| Start::Leaf(Value::Null)),
        )),
        "value",
    )
    .parse(input)
}

fn member_key<'a>(input: Input<'a>) -> PResult<'a, String> {
    map(seq((string, ws, literal(":"), ws)), |(key, _, _, _)| key).parse(input)
}

/// Open one more container when `open` are already open.
fn enter(open: usize, limits: &Limits) -> Result<()> {
    let depth = open as u64 + 1;
    if depth > limits.max_nesting_depth {
        return Err(Error::NestingTooDeep(depth, limits.max_nesting_depth));
    }
    Ok(())
}

fn push_element(items: &mut Vec<Value>, item: Value, limits: &Limits) -> Result<()> {
    let count = items.len() as u64 + 1;
    if count > limits.max_array_length {
        return Err(Error::ArrayTooLong(count, limits.max_array_length));
    }
    items.push(item);
    Ok(())
}

fn insert_member(entries: &mut Map, key: String, value: Value, limits: &Limits) -> Result<()> {
    if entries.contains_key(&key) {
        return Err(Error::DuplicateKey(key));
    }
    let count = entries.len() as u64 + 1;
    if count > limits.max_object_fields {
        return Err(Error::TooManyFields(count, limits.max_object_fields));
    }
    entries.insert(key, value);
    Ok(())
}

/// A complete value. Open containers live on an explicit stack, so deep
/// documents cost heap rather than call stack.
fn value<'a>(input: Input<'a>) -> PResult<'a, Value> {
    let limits = input.limits();
    let mut stack: Vec<Frame> = Vec::new();
    let mut input = input;

    loop {
        let (rest, opening) = start(input)?;
        let (mut rest, mut done) = match opening {
            Start::Leaf(value) => (rest, value),
            Start::Array => {
                enter(stack.len(), limits)?;
                let (rest, _) = ws(rest)?;
                match opt(literal("]")).parse(rest)? {
                    (rest, Some(_)) => (rest, Value::Array(Vec::new())),
                    (rest, None) => {
                        stack.push(Frame::Array(Vec::new()));
                        input = rest;
                        continue;
                    }
                }
            }
            Start::Object => {
                enter(stack.len(), limits)?;
                let (rest, _) = ws(rest)?;
                match alt((map(literal("}"), |_| None), map(member_key, Some))).parse(rest)? {
                    (rest, None) => (rest, Value::Object(Map::new())),
                    (rest, Some(key)) => {
                        stack.push(Frame::Object(Map::new(), key));
                        input = rest;
                        continue;
                    }
                }
            }
        };

        // Close containers until one expects another element.
        loop {
            let Some(frame) = stack.pop() else {
                return Ok((rest, done));
            };
            let (after, _) = ws(rest)?;
            match frame {
                Frame::Array(mut items) => {
                    push_element(&mut items, done, limits)?;
                    if let (next, Some(_)) = opt(comma).parse(after)? {
                        stack.push(Frame::Array(items));
                        input = next;
                        break;
                    }
                    (rest, _) = literal("]").parse(after)?;
                    done = Value::Array(items);
                }
                Frame::Object(mut entries, key) => {
                    insert_member(&mut entries, key, done, limits)?;
                    if let (next, Some(_)) = opt(comma).parse(after)? {
                        let (next, key) = member_key(next)?;
                        stack.push(Frame::Object(entries, key));
                        input = next;
                        break;
                    }
                    (rest, _) = literal("}").parse(after)?;
                    done = Value::Object(entries);
                }
            }
        }
    }
}

fn string<'a>(input: Input<'a>) -> PResult<'a, String> {
    let start = input.offset();
    let max_length = input.limits().max_string_length;

    let unescaped = map(
        filter(
            scalar,
            |c: &char| !matches!(*c, '"' | '\\' | '\u{0}'..='\u{1f}'),
            "string character",
        ),
        Piece::Scalar,
    );
    let (rest, (_, pieces, _)) =
        seq((literal("\""), many(alt((unescaped, escape))), literal("\""))).parse(input)?;

    let decoded = decode_pieces(pieces).ok_or(Error::UnpairedSurrogate { offset: start })?;
    let length = decoded.len() as u64;
    if length > max_length {
        return Err(Error::StringTooLong(length, max_length).into());
    }
    Ok((rest, decoded))
}

fn escape<'a>(input: Input<'a>) -> PResult<'a, Piece> {
    let offset = input.offset();

    let simple = map(
        filter(
            scalar,
            |c: &char| matches!(*c, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't'),
            "escape character",
        ),
        |c| {
            Piece::Scalar(match c {
                'b' => '\u{8}',
                'f' => '\u{c}',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            })
        },
    );
    let unicode = map_res(pattern(&UNICODE_ESCAPE, "unicode escape"), move |hex: &str| {
        u16::from_str_radix(&hex[1..], 16)
            .map(Piece::Unit)
            .map_err(|_| Error::Grammar {
                offset,
                expected: "unicode escape",
            })
    });

    map(seq((literal("\\"), alt((simple, unicode)))), |(_, piece)| piece).parse(input)
}

/// Join decoded pieces, pairing surrogate escapes. `None` if a surrogate is
/// left unpaired.
fn decode_pieces(pieces: Vec<Piece>) -> Option<String> {
    let mut units = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Scalar(c) => units.extend_from_slice(c.encode_utf16(&mut [0; 2])),
            Piece::Unit(unit) => units.push(unit),
        }
    }
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

fn number<'a>(input: Input<'a>) -> PResult<'a, Value> {
    let max_length = input.limits().max_number_length;

    map_res(pattern(&NUMBER, "number"), move |text: &str| {
        let length = text.len() as u64;
        if length > max_length {
            return Err(Error::NumberTooLong(length, max_length));
        }
        strict_parse_f64(text)
            .and_then(Number::new)
            .map(Value::Number)
    })
    .parse(input)
}

/// Parse JSON text with default limits.
pub fn parse(text: &str) -> Result<Value> {
    parse_with_limits(text, Limits::default())
}

/// Parse JSON text with custom limits.
pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Value> {
    let size = text.len() as u64;
    if size > limits.max_input_size {
        return Err(Error::InputTooLarge(size, limits.max_input_size));
    }

    tracing::debug!(bytes = size, "parsing document");
    let input = Input::new(text, &limits);
    let (rest, (_, document, _)) = seq((ws, value, ws))
        .parse(input)
        .map_err(Failure::into_error)
        .inspect_err(|error| tracing::debug!(%error, "parse failed"))?;

    if !rest.is_empty() {
        tracing::debug!(offset = rest.offset(), "trailing input");
        return Err(Error::TrailingInput {
            offset: rest.offset(),
        });
    }
    Ok(document)
}

/// Parse UTF-8 bytes with default limits.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value> {
    parse_bytes_with_limits(bytes, Limits::default())
}

/// Parse UTF-8 bytes with custom limits. Invalid UTF-8 is an input-type
/// error, reported before any grammar check.
pub fn parse_bytes_with_limits(bytes: &[u8], limits: Limits) -> Result<Value> {
    let size = bytes.len() as u64;
    if size > limits.max_input_size {
        return Err(Error::InputTooLarge(size, limits.max_input_size));
    }
    let text =
        std::str::from_utf8(bytes).map_err(|error| Error::InvalidUtf8(error.valid_up_to()))?;
    parse_with_limits(text, limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> Value {
        Value::try_from(value).unwrap()
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("false").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("42").unwrap(), number(42.0));
        assert_eq!(parse("-123").unwrap(), number(-123.0));
        assert_eq!(parse("0.5e1").unwrap(), number(5.0));
        assert_eq!(parse("-0").unwrap(), number(-0.0));
        assert_ne!(parse("-0").unwrap(), number(0.0));
    }

    #[test]
    fn test_parse_string_escapes() {
        assert_eq!(
            parse(r#""a\"\\\/\b\f\n\r\tAé""#).unwrap(),
            Value::String("a\"\\/\u{8}\u{c}\n\r\tAé".to_string())
        );
        assert_eq!(
            parse(r#""💩""#).unwrap(),
            Value::String("💩".to_string())
        );
        assert_eq!(parse("\"\u{7f}\"").unwrap(), Value::String("\u{7f}".to_string()));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            parse("[1, 2, 3]").unwrap(),
            Value::Array(vec![number(1.0), number(2.0), number(3.0)])
        );
        assert_eq!(parse("[ ]").unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_parse_object_keeps_order() {
        let value = parse(r#"{"b": 1, "a": 2}"#).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(value.get("a"), Some(&number(2.0)));
    }

    #[test]
    fn test_nested_structure() {
        let value = parse(r#"{"arr": [1, {"nested": true}], "num": 42}"#).unwrap();
        assert!(value.get("arr").unwrap().is_array());
        assert_eq!(
            value.get("arr").unwrap().get_index(1).unwrap().get("nested"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert_eq!(
            parse(r#"{"a": 1, "a": 2}"#).unwrap_err(),
            Error::DuplicateKey("a".to_string())
        );
        assert_eq!(
            parse(r#"{ "💩": 0, "💩": 1 }"#).unwrap_err(),
            Error::DuplicateKey("💩".to_string())
        );
    }

    #[test]
    fn test_inexact_number_rejected() {
        assert!(matches!(parse("[0.1]"), Err(Error::PrecisionLoss { .. })));
        assert!(matches!(parse("1e400"), Err(Error::NumberOutOfRange { .. })));
    }

    #[test]
    fn test_grammar_errors() {
        for text in ["", "[1, 2,]", "{\"a\" 1}", "'a'", "01", "1.", "[1}", "\"\u{1}\"", "nul"] {
            let error = parse(text).unwrap_err();
            assert_eq!(error.kind(), crate::error::ErrorKind::Grammar, "{text:?}: {error}");
        }
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(
            parse("{\"a\" 1}").unwrap_err(),
            Error::Grammar {
                offset: 5,
                expected: ":"
            }
        );
        assert_eq!(
            parse("[1}").unwrap_err(),
            Error::Grammar {
                offset: 2,
                expected: "]"
            }
        );
        assert_eq!(parse("null extra").unwrap_err(), Error::TrailingInput { offset: 5 });
    }

    #[test]
    fn test_unpaired_surrogates_rejected() {
        assert_eq!(
            parse(r#"["\ud800"]"#).unwrap_err(),
            Error::UnpairedSurrogate { offset: 1 }
        );
        assert!(parse(r#""\udc00\ud800""#).is_err());
    }

    #[test]
    fn test_nesting_depth_limit() {
        let limits = Limits {
            max_nesting_depth: 2,
            ..Limits::standard()
        };
        assert!(parse_with_limits("[[1]]", limits).is_ok());
        assert!(parse_with_limits(r#"{"a": [1]}"#, limits).is_ok());
        assert_eq!(
            parse_with_limits("[[[1]]]", limits).unwrap_err(),
            Error::NestingTooDeep(3, 2)
        );
    }

    #[test]
    fn test_empty_containers_count_towards_depth() {
        let limits = Limits {
            max_nesting_depth: 2,
            ..Limits::standard()
        };
        assert!(parse_with_limits("[{}]", limits).is_ok());
        assert_eq!(
            parse_with_limits("[[[]]]", limits).unwrap_err(),
            Error::NestingTooDeep(3, 2)
        );
        assert_eq!(
            parse_with_limits(r#"{"a":[{}]}"#, limits).unwrap_err(),
            Error::NestingTooDeep(3, 2)
        );
    }

    #[test]
    fn test_deep_document_parses_without_recursion() {
        let depth = 50_000;
        let limits = Limits {
            max_nesting_depth: depth,
            ..Limits::lenient()
        };
        let text = "[".repeat(depth as usize) + &"]".repeat(depth as usize);
        let mut value = parse_with_limits(&text, limits).unwrap();

        let mut levels = 0;
        // Unwind by hand; dropping a deeply nested Vec recurses.
        while let Value::Array(mut items) = value {
            levels += 1;
            value = items.pop().unwrap_or_default();
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn test_collection_limits() {
        let limits = Limits {
            max_object_fields: 2,
            max_array_length: 2,
            ..Limits::standard()
        };
        assert_eq!(
            parse_with_limits(r#"{"a": 1, "b": 2, "c": 3}"#, limits).unwrap_err(),
            Error::TooManyFields(3, 2)
        );
        assert_eq!(
            parse_with_limits("[1, 2, 3]", limits).unwrap_err(),
            Error::ArrayTooLong(3, 2)
        );
    }

    #[test]
    fn test_scalar_limits() {
        let limits = Limits {
            max_string_length: 3,
            max_number_length: 3,
            max_input_size: 16,
            ..Limits::standard()
        };
        assert_eq!(
            parse_with_limits(r#""abcd""#, limits).unwrap_err(),
            Error::StringTooLong(4, 3)
        );
        assert_eq!(
            parse_with_limits("1234", limits).unwrap_err(),
            Error::NumberTooLong(4, 3)
        );
        assert_eq!(
            parse_with_limits("[1, 2, 3, 4, 5, 6]", limits).unwrap_err(),
            Error::InputTooLarge(18, 16)
        );
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        assert_eq!(parse_bytes(b"[1, 2]").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(parse_bytes(b"\"ab\xff\"").unwrap_err(), Error::InvalidUtf8(3));
    }
}
