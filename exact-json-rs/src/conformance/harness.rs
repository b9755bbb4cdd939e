//! Differential testing against `serde_json`.
//!
//! Every document is decoded by both parsers. The outcomes must agree,
//! except that this crate may reject a document `serde_json` accepts when
//! the rejection is one of its deliberate strictness rules: an inexact
//! number, a repeated key, or a resource limit.

use super::repro::ReproBundle;
use super::{ConformanceError, ConformanceResult};
use crate::error::{Error, ErrorKind};
use crate::json::{parse_bytes_with_limits, stringify_with_limits, Limits, Map, Number, Value};
use std::fs;
use std::path::Path;

/// What one parser made of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted; the canonical encoding of the decoded value.
    Ok(String),
    /// Rejected; a description of the error.
    Err(String),
}

impl Outcome {
    /// Check if this is an Ok result.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Check if this is an Err result.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Get the value as a string (either the encoding or the error).
    pub fn as_string(&self) -> &str {
        match self {
            Self::Ok(s) => s,
            Self::Err(s) => s,
        }
    }
}

/// Result of a differential test.
#[derive(Debug)]
pub enum DiffResult {
    /// Both parsers produced the same value, or both rejected.
    Match {
        /// The shared outcome.
        outcome: Outcome,
    },
    /// Only this crate rejected, for a reason `serde_json` does not check.
    Stricter {
        /// Why this crate rejected the document.
        reason: Error,
    },
    /// The parsers disagree.
    Mismatch {
        /// This crate's outcome.
        ours: Outcome,
        /// `serde_json`'s outcome.
        reference: Outcome,
        /// Repro bundle for debugging.
        repro: ReproBundle,
    },
}

impl DiffResult {
    /// Check if the result is a match.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    /// Check if the result is an expected strict rejection.
    pub fn is_stricter(&self) -> bool {
        matches!(self, Self::Stricter { .. })
    }

    /// Check if the result is a mismatch.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Differential test harness comparing this crate with `serde_json`.
#[derive(Debug, Default)]
pub struct DiffTestHarness {
    limits: Limits,
}

impl DiffTestHarness {
    /// Create a harness that parses with `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Decode `document` with both parsers and compare.
    pub fn compare(&self, test_name: &str, document: &[u8]) -> DiffResult {
        let ours = parse_bytes_with_limits(document, self.limits);
        let reference = serde_json::from_slice::<serde_json::Value>(document)
            .map_err(|e| e.to_string())
            .and_then(|v| from_reference(&v));

        match (ours, reference) {
            (Ok(a), Ok(b)) if a == b => DiffResult::Match {
                outcome: encode(&a, self.limits),
            },
            (Err(a), Err(b)) => {
                tracing::trace!(test_name, ours = %a, reference = %b, "both rejected");
                DiffResult::Match {
                    outcome: Outcome::Err(a.kind().to_string()),
                }
            }
            (Err(reason), Ok(_)) if is_strictness(&reason) => DiffResult::Stricter { reason },
            (ours, reference) => {
                let ours = match ours {
                    Ok(v) => encode(&v, self.limits),
                    Err(e) => Outcome::Err(format!("{}: {}", e.kind(), e)),
                };
                let reference = match reference {
                    Ok(v) => encode(&v, self.limits),
                    Err(e) => Outcome::Err(e),
                };
                tracing::warn!(
                    test_name,
                    ours = ours.as_string(),
                    reference = reference.as_string(),
                    "parsers disagree"
                );
                let repro = ReproBundle::new(
                    test_name.to_string(),
                    String::from_utf8_lossy(document).into_owned(),
                    ours.clone(),
                    reference.clone(),
                );
                DiffResult::Mismatch {
                    ours,
                    reference,
                    repro,
                }
            }
        }
    }

    /// Run a batch of differential tests.
    pub fn run_batch<'a>(&self, tests: impl Iterator<Item = (&'a str, &'a [u8])>) -> BatchResult {
        let mut results = BatchResult::new();

        for (name, document) in tests {
            match self.compare(name, document) {
                DiffResult::Match { .. } => results.record_pass(name),
                DiffResult::Stricter { reason } => results.record_stricter(name, &reason),
                DiffResult::Mismatch {
                    ours,
                    reference,
                    repro,
                } => results.record_fail(name, ours, reference, repro),
            }
        }

        results
    }

    /// Compare every `*.json` file in `dir`, in file name order.
    pub fn run_dir<P: AsRef<Path>>(&self, dir: P) -> ConformanceResult<BatchResult> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| ConformanceError::io(dir, e))? {
            let path = entry.map_err(|e| ConformanceError::io(dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            let bytes = fs::read(path).map_err(|e| ConformanceError::io(path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            documents.push((name, bytes));
        }

        Ok(self.run_batch(
            documents
                .iter()
                .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
        ))
    }
}

fn is_strictness(error: &Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::PrecisionLoss | ErrorKind::DuplicateKey | ErrorKind::Range
    )
}

fn encode(value: &Value, limits: Limits) -> Outcome {
    match stringify_with_limits(value, limits) {
        Ok(text) => Outcome::Ok(text),
        Err(e) => Outcome::Err(e.to_string()),
    }
}

/// Convert a `serde_json` tree, taking each number at its nearest binary64
/// value.
fn from_reference(value: &serde_json::Value) -> Result<Value, String> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            let f = n.as_f64().ok_or_else(|| format!("unrepresentable number {}", n))?;
            Value::Number(Number::new(f).map_err(|e| e.to_string())?)
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(from_reference)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), from_reference(v)?)))
                .collect::<Result<Map, String>>()?,
        ),
    })
}

/// Results from running a batch of differential tests.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Number of documents both parsers agreed on.
    pub passed: usize,
    /// Number of documents only this crate rejected, by design.
    pub stricter: usize,
    /// Number of documents the parsers disagreed on.
    pub failed: usize,
    /// Names and rejection kinds of the stricter documents.
    pub stricter_details: Vec<(String, ErrorKind)>,
    /// Details of failures.
    pub failures: Vec<FailureDetail>,
}

/// Details about a test failure.
#[derive(Debug)]
pub struct FailureDetail {
    /// Test name.
    pub name: String,
    /// This crate's outcome.
    pub ours: Outcome,
    /// `serde_json`'s outcome.
    pub reference: Outcome,
    /// Repro bundle.
    pub repro: ReproBundle,
}

impl BatchResult {
    /// Create a new empty batch result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an agreeing document.
    pub fn record_pass(&mut self, _name: &str) {
        self.passed += 1;
    }

    /// Record a document only this crate rejected.
    pub fn record_stricter(&mut self, name: &str, reason: &Error) {
        self.stricter += 1;
        self.stricter_details.push((name.to_string(), reason.kind()));
    }

    /// Record a failing test.
    pub fn record_fail(&mut self, name: &str, ours: Outcome, reference: Outcome, repro: ReproBundle) {
        self.failed += 1;
        self.failures.push(FailureDetail {
            name: name.to_string(),
            ours,
            reference,
            repro,
        });
    }

    /// Check if no document produced a disagreement.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get total number of documents compared.
    pub fn total(&self) -> usize {
        self.passed + self.stricter + self.failed
    }

    /// Format a summary string.
    pub fn summary(&self) -> String {
        format!(
            "{} agreed, {} stricter, {} disagreed (total: {})",
            self.passed,
            self.stricter,
            self.failed,
            self.total()
        )
    }
}
