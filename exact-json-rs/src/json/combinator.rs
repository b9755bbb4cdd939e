//! Parser combinators.
//!
//! A parser is anything implementing [`Parser`]; every
//! `Fn(Input<'a>) -> PResult<'a, O>` qualifies, so productions are plain
//! functions and closures. Recursive productions are written as functions,
//! which keeps recursive references lazy.
//!
//! Failures come in two strengths:
//!
//! - [`Failure::Backtrack`] lets an enclosing [`alt`] try its next branch.
//!   Alternation keeps the failure that got furthest into the input, so the
//!   reported offset points at the real problem.
//! - [`Failure::Fatal`] aborts the whole parse (duplicate keys, inexact
//!   numbers, limits).
//!
//! Repetition ([`many`], [`sep_by_fold`]) and [`opt`] stop quietly only when the inner
//! parser fails without consuming input. A parser that fails part-way
//! through has committed, and its failure is propagated.
//!
//! Nesting is not tracked here; the grammar keeps open containers on its
//! own stack.

use std::sync::LazyLock;

use regex::Regex;

use super::limits::Limits;
use crate::error::Error;

/// Parser state: the full source and a byte position.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    src: &'a str,
    pos: usize,
    limits: &'a Limits,
}

impl<'a> Input<'a> {
    /// Start parsing `src` at offset 0.
    pub fn new(src: &'a str, limits: &'a Limits) -> Self {
        Self {
            src,
            pos: 0,
            limits,
        }
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos == self.src.len()
    }

    /// Limits in force for this parse.
    pub fn limits(&self) -> &'a Limits {
        self.limits
    }

    fn advance(self, len: usize) -> Self {
        Self {
            pos: self.pos + len,
            ..self
        }
    }
}

/// Why a parser did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Recoverable mismatch.
    Backtrack {
        /// Byte offset where the mismatch was detected.
        offset: usize,
        /// What would have matched.
        expected: &'static str,
    },
    /// Unrecoverable error.
    Fatal(Error),
}

impl Failure {
    /// Recoverable mismatch at the current position.
    pub fn backtrack(input: Input<'_>, expected: &'static str) -> Self {
        Failure::Backtrack {
            offset: input.offset(),
            expected,
        }
    }

    /// Convert into the error reported to callers.
    pub fn into_error(self) -> Error {
        match self {
            Failure::Backtrack { offset, expected } => Error::Grammar { offset, expected },
            Failure::Fatal(error) => error,
        }
    }

    fn offset(&self) -> Option<usize> {
        match self {
            Failure::Backtrack { offset, .. } => Some(*offset),
            Failure::Fatal(_) => None,
        }
    }

    /// Of two failures, the one that got further (the earlier one on ties).
    fn furthest(current: Option<Failure>, next: Failure) -> Failure {
        match current {
            Some(current) if current.offset() >= next.offset() => current,
            _ => next,
        }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Failure::Fatal(error)
    }
}

/// Remaining input and output of a successful parse.
pub type PResult<'a, O> = Result<(Input<'a>, O), Failure>;

/// Something that parses an `O` from an [`Input`].
pub trait Parser<'a, O> {
    /// Run the parser.
    fn parse(&self, input: Input<'a>) -> PResult<'a, O>;
}

impl<'a, O, F> Parser<'a, O> for F
where
    F: Fn(Input<'a>) -> PResult<'a, O>,
{
    fn parse(&self, input: Input<'a>) -> PResult<'a, O> {
        self(input)
    }
}

/// A tuple of parsers run one after another; see [`seq`].
pub trait Sequence<'a, O> {
    /// Run every parser in order, collecting the outputs.
    fn run(&self, input: Input<'a>) -> PResult<'a, O>;
}

/// A tuple of parsers tried in order; see [`alt`].
pub trait Alternatives<'a, O> {
    /// Return the first success.
    fn choice(&self, input: Input<'a>) -> PResult<'a, O>;
}

macro_rules! sequence_impl {
    ($($parser:ident $output:ident $index:tt),+) => {
        impl<'a, $($output,)+ $($parser,)+> Sequence<'a, ($($output,)+)> for ($($parser,)+)
        where
            $($parser: Parser<'a, $output>,)+
        {
            #[allow(non_snake_case)]
            fn run(&self, input: Input<'a>) -> PResult<'a, ($($output,)+)> {
                $(let (input, $output) = self.$index.parse(input)?;)+
                Ok((input, ($($output,)+)))
            }
        }
    };
}

sequence_impl!(A OA 0, B OB 1);
sequence_impl!(A OA 0, B OB 1, C OC 2);
sequence_impl!(A OA 0, B OB 1, C OC 2, D OD 3);
sequence_impl!(A OA 0, B OB 1, C OC 2, D OD 3, E OE 4);
sequence_impl!(A OA 0, B OB 1, C OC 2, D OD 3, E OE 4, F OF 5);

macro_rules! alternatives_impl {
    ($($parser:ident $index:tt),+) => {
        impl<'a, O, $($parser,)+> Alternatives<'a, O> for ($($parser,)+)
        where
            $($parser: Parser<'a, O>,)+
        {
            fn choice(&self, input: Input<'a>) -> PResult<'a, O> {
                let mut furthest = None;
                $(
                    match self.$index.parse(input) {
                        Ok(done) => return Ok(done),
                        Err(Failure::Fatal(error)) => return Err(Failure::Fatal(error)),
                        Err(failure) => furthest = Some(Failure::furthest(furthest, failure)),
                    }
                )+
                Err(furthest.unwrap_or_else(|| Failure::backtrack(input, "alternative")))
            }
        }
    };
}

alternatives_impl!(A 0, B 1);
alternatives_impl!(A 0, B 1, C 2);
alternatives_impl!(A 0, B 1, C 2, D 3);
alternatives_impl!(A 0, B 1, C 2, D 3, E 4);
alternatives_impl!(A 0, B 1, C 2, D 3, E 4, F 5);
alternatives_impl!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
alternatives_impl!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Match an exact string.
pub fn literal<'a>(expected: &'static str) -> impl Fn(Input<'a>) -> PResult<'a, &'a str> {
    move |input: Input<'a>| {
        let rest = input.rest();
        if rest.starts_with(expected) {
            Ok((input.advance(expected.len()), &rest[..expected.len()]))
        } else {
            Err(Failure::backtrack(input, expected))
        }
    }
}

/// Match a regular expression at the current position.
///
/// Patterns should be anchored with `\A`; a match starting anywhere else is
/// treated as a mismatch.
pub fn pattern<'a>(
    regex: &'static LazyLock<Regex>,
    expected: &'static str,
) -> impl Fn(Input<'a>) -> PResult<'a, &'a str> {
    move |input: Input<'a>| match regex.find(input.rest()) {
        Some(found) if found.start() == 0 => Ok((input.advance(found.end()), found.as_str())),
        _ => Err(Failure::backtrack(input, expected)),
    }
}

/// Match any single Unicode scalar value.
pub fn scalar(input: Input<'_>) -> PResult<'_, char> {
    match input.rest().chars().next() {
        Some(c) => Ok((input.advance(c.len_utf8()), c)),
        None => Err(Failure::backtrack(input, "character")),
    }
}

/// Run a tuple of parsers in order.
pub fn seq<'a, O, S>(parsers: S) -> impl Fn(Input<'a>) -> PResult<'a, O>
where
    S: Sequence<'a, O>,
{
    move |input: Input<'a>| parsers.run(input)
}

/// Try a tuple of parsers in order; the first success wins.
pub fn alt<'a, O, A>(alternatives: A) -> impl Fn(Input<'a>) -> PResult<'a, O>
where
    A: Alternatives<'a, O>,
{
    move |input: Input<'a>| alternatives.choice(input)
}

/// Transform the output of a parser.
pub fn map<'a, O, U, P, F>(parser: P, f: F) -> impl Fn(Input<'a>) -> PResult<'a, U>
where
    P: Parser<'a, O>,
    F: Fn(O) -> U,
{
    move |input: Input<'a>| {
        let (rest, out) = parser.parse(input)?;
        Ok((rest, f(out)))
    }
}

/// Transform the output of a parser with a fallible function. An error
/// from `f` is fatal.
pub fn map_res<'a, O, U, P, F>(parser: P, f: F) -> impl Fn(Input<'a>) -> PResult<'a, U>
where
    P: Parser<'a, O>,
    F: Fn(O) -> Result<U, Error>,
{
    move |input: Input<'a>| {
        let (rest, out) = parser.parse(input)?;
        Ok((rest, f(out)?))
    }
}

/// Accept the output of a parser only if it satisfies `predicate`.
pub fn filter<'a, O, P, F>(
    parser: P,
    predicate: F,
    expected: &'static str,
) -> impl Fn(Input<'a>) -> PResult<'a, O>
where
    P: Parser<'a, O>,
    F: Fn(&O) -> bool,
{
    move |input: Input<'a>| {
        let (rest, out) = parser.parse(input)?;
        if predicate(&out) {
            Ok((rest, out))
        } else {
            Err(Failure::backtrack(input, expected))
        }
    }
}

/// Replace what a parser reports as expected when it fails without
/// consuming input.
pub fn label<'a, O, P>(parser: P, expected: &'static str) -> impl Fn(Input<'a>) -> PResult<'a, O>
where
    P: Parser<'a, O>,
{
    move |input: Input<'a>| {
        parser.parse(input).map_err(|failure| match failure {
            Failure::Backtrack { offset, .. } if offset == input.offset() => {
                Failure::Backtrack { offset, expected }
            }
            other => other,
        })
    }
}

/// Turn a failure that consumed nothing into a clean stop.
fn recover<'a>(failure: Failure, input: Input<'a>) -> Result<Input<'a>, Failure> {
    match failure {
        Failure::Backtrack { offset, .. } if offset == input.offset() => Ok(input),
        other => Err(other),
    }
}

/// Zero or more repetitions.
pub fn many<'a, O, P>(parser: P) -> impl Fn(Input<'a>) -> PResult<'a, Vec<O>>
where
    P: Parser<'a, O>,
{
    move |mut input: Input<'a>| {
        let mut items = Vec::new();
        loop {
            match parser.parse(input) {
                Ok((rest, _)) if rest.offset() == input.offset() => return Ok((rest, items)),
                Ok((rest, item)) => {
                    items.push(item);
                    input = rest;
                }
                Err(failure) => return Ok((recover(failure, input)?, items)),
            }
        }
    }
}

/// Zero or more items separated by `separator`, folded into an accumulator.
///
/// `step` may refuse an item; its error is fatal. Once a separator has
/// matched, the next item is mandatory.
pub fn sep_by_fold<'a, O, S, A, P, SP, I, F>(
    item: P,
    separator: SP,
    init: I,
    step: F,
) -> impl Fn(Input<'a>) -> PResult<'a, A>
where
    P: Parser<'a, O>,
    SP: Parser<'a, S>,
    I: Fn() -> A,
    F: Fn(&mut A, O) -> Result<(), Error>,
{
    move |input: Input<'a>| {
        let mut acc = init();
        let mut input = match item.parse(input) {
            Ok((rest, first)) => {
                step(&mut acc, first)?;
                rest
            }
            Err(failure) => return Ok((recover(failure, input)?, acc)),
        };
        loop {
            let after_separator = match separator.parse(input) {
                Ok((rest, _)) => rest,
                Err(failure) => return Ok((recover(failure, input)?, acc)),
            };
            let (rest, next) = item.parse(after_separator)?;
            step(&mut acc, next)?;
            input = rest;
        }
    }
}

/// Zero or more items separated by `separator`.
pub fn sep_by<'a, O, S, P, SP>(item: P, separator: SP) -> impl Fn(Input<'a>) -> PResult<'a, Vec<O>>
where
    P: Parser<'a, O>,
    SP: Parser<'a, S>,
{
    sep_by_fold(item, separator, Vec::new, |items: &mut Vec<O>, next| {
        items.push(next);
        Ok(())
    })
}

/// Optional match. A failure that consumed nothing gives `None`.
pub fn opt<'a, O, P>(parser: P) -> impl Fn(Input<'a>) -> PResult<'a, Option<O>>
where
    P: Parser<'a, O>,
{
    move |input: Input<'a>| match parser.parse(input) {
        Ok((rest, out)) => Ok((rest, Some(out))),
        Err(failure) => Ok((recover(failure, input)?, None)),
    }
}
