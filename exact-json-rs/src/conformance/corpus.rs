//! Corpus-based conformance testing.
//!
//! A corpus is a JSON file holding a manifest and a list of test vectors.
//! Each vector names an operation, its input and the expected outcome:
//!
//! ```json
//! {"id": "parse-half", "op": "parse", "input": {"text": "0.5"}, "expected": {"ok": "0.5"}}
//! {"id": "parse-tenth", "op": "parse", "input": {"text": "0.1"}, "expected": {"err": "PrecisionLoss"}}
//! ```
//!
//! Successful outcomes are compared as strings, errors by
//! [`ErrorKind`] name.
//!
//! | op | input | ok value |
//! |----|-------|----------|
//! | `parse` | `text` | canonical re-encoding |
//! | `stringify_number` | `bits` (hex) | encoded number |
//! | `decode_float` | `bits` (hex) | `sign=S exponent=E mantissa=0xM` |
//! | `exact_decimal` | `bits` (hex) | full decimal expansion |
//! | `strict_parse` | `literal` | bits of the value (16 hex digits) |

use super::{ConformanceError, ConformanceResult};
use crate::error::{Error, ErrorKind};
use crate::json::stringify::serialize_number;
use crate::json::{parse_with_limits, stringify_with_limits, Limits, Number};
use crate::number::{decode_float, exact_decimal, strict_parse_f64};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Corpus manifest with metadata.
#[derive(Debug, Deserialize)]
pub struct CorpusManifest {
    /// Format version of the corpus file.
    pub format_version: String,
    /// Corpus version.
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A corpus containing test vectors.
#[derive(Debug, Deserialize)]
pub struct Corpus {
    /// Corpus metadata.
    pub manifest: CorpusManifest,
    /// List of test vectors.
    pub vectors: Vec<TestVector>,
}

/// Expected outcome of a test vector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expected {
    /// Success with this rendered result.
    Ok(String),
    /// Failure with this [`ErrorKind`] name.
    Err(String),
}

/// A single test vector.
#[derive(Debug, Deserialize)]
pub struct TestVector {
    /// Unique identifier for the test.
    pub id: String,
    /// Operation to test (e.g., "parse", "decode_float").
    pub op: String,
    /// Input parameters for the operation.
    pub input: serde_json::Value,
    /// Expected result (success or error).
    pub expected: Expected,
}

/// Outcome of one vector.
#[derive(Debug)]
pub enum TestResult {
    /// Matched the expectation.
    Pass,
    /// Ran, but produced something else.
    Fail {
        /// What the corpus asked for.
        expected: String,
        /// What came out.
        actual: String,
    },
    /// Operation not known to this runner.
    Skip {
        /// Why it was not run.
        reason: String,
    },
    /// The vector itself is malformed.
    Error {
        /// What is wrong with it.
        message: String,
    },
}

impl TestResult {
    /// True for [`TestResult::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Tag printed in front of a report line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail { .. } => "FAIL",
            Self::Skip { .. } => "SKIP",
            Self::Error { .. } => "ERROR",
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("ok"),
            Self::Fail { expected, actual } => write!(f, "expected {expected}, got {actual}"),
            Self::Skip { reason } => f.write_str(reason),
            Self::Error { message } => f.write_str(message),
        }
    }
}

/// Counts for a corpus run, plus every vector that did not pass.
#[derive(Debug, Default)]
pub struct CorpusResults {
    /// Vectors that passed.
    pub passed: usize,
    /// Vectors that failed.
    pub failed: usize,
    /// Vectors with an unknown operation.
    pub skipped: usize,
    /// Malformed vectors.
    pub errors: usize,
    /// Non-passing vectors by id, in corpus order.
    pub problems: Vec<(String, TestResult)>,
}

impl CorpusResults {
    fn record(&mut self, id: &str, result: TestResult) {
        match result {
            TestResult::Pass => {
                self.passed += 1;
                return;
            }
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Skip { .. } => self.skipped += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
        self.problems.push((id.to_string(), result));
    }

    /// Number of vectors run.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    /// No failures and no malformed vectors. Skips are allowed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// One-line tally.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped, {} errors (total: {})",
            self.passed,
            self.failed,
            self.skipped,
            self.errors,
            self.total()
        )
    }
}

/// Corpus runner that executes test vectors.
pub struct CorpusRunner {
    corpus: Corpus,
    limits: Limits,
}

impl CorpusRunner {
    /// Load corpus from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConformanceError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Build a runner from corpus JSON text.
    pub fn from_json(content: &str) -> ConformanceResult<Self> {
        let corpus: Corpus = serde_json::from_str(content)
            .map_err(|e| ConformanceError::CorpusFormat(e.to_string()))?;
        Ok(Self {
            corpus,
            limits: Limits::default(),
        })
    }

    /// Use `limits` for `parse` vectors instead of the standard ones.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the corpus manifest.
    pub fn manifest(&self) -> &CorpusManifest {
        &self.corpus.manifest
    }

    /// Get the number of test vectors.
    pub fn vector_count(&self) -> usize {
        self.corpus.vectors.len()
    }

    /// Run all test vectors and return results.
    pub fn run_all(&self) -> CorpusResults {
        let mut results = CorpusResults::default();

        for vector in &self.corpus.vectors {
            let result = self.run_vector(vector);
            if !result.is_pass() {
                tracing::debug!(id = %vector.id, ?result, "corpus vector did not pass");
            }
            results.record(&vector.id, result);
        }

        results
    }

    /// Run a single test vector.
    pub fn run_vector(&self, vector: &TestVector) -> TestResult {
        let actual = match vector.op.as_str() {
            "parse" => input_str(vector, "text").map(|text| self.run_parse(text)),
            "stringify_number" => input_bits(vector).map(run_stringify_number),
            "decode_float" => input_bits(vector).map(run_decode_float),
            "exact_decimal" => input_bits(vector).map(run_exact_decimal),
            "strict_parse" => input_str(vector, "literal").map(run_strict_parse),
            _ => {
                return TestResult::Skip {
                    reason: format!("Unknown operation: {}", vector.op),
                }
            }
        };

        match actual {
            Ok(actual) => compare(&vector.expected, actual),
            Err(message) => TestResult::Error { message },
        }
    }

    fn run_parse(&self, text: &str) -> Result<String, Error> {
        let value = parse_with_limits(text, self.limits)?;
        stringify_with_limits(&value, self.limits)
    }
}

fn run_stringify_number(bits: u64) -> Result<String, Error> {
    let number = Number::new(f64::from_bits(bits))?;
    let mut out = String::new();
    serialize_number(number, &mut out)?;
    Ok(out)
}

fn run_decode_float(bits: u64) -> Result<String, Error> {
    let decoded = decode_float(f64::from_bits(bits))?;
    Ok(format!(
        "sign={} exponent={} mantissa={:#x}",
        decoded.sign, decoded.exponent, decoded.mantissa
    ))
}

fn run_exact_decimal(bits: u64) -> Result<String, Error> {
    Ok(exact_decimal(f64::from_bits(bits))?.to_fixed())
}

fn run_strict_parse(literal: &str) -> Result<String, Error> {
    Ok(format!("{:016x}", strict_parse_f64(literal)?.to_bits()))
}

fn compare(expected: &Expected, actual: Result<String, Error>) -> TestResult {
    match (expected, actual) {
        (Expected::Ok(want), Ok(got)) if *want == got => TestResult::Pass,
        (Expected::Err(want), Err(e)) if ErrorKind::from_name(want) == Some(e.kind()) => {
            TestResult::Pass
        }
        (Expected::Err(want), Err(_)) if ErrorKind::from_name(want).is_none() => {
            TestResult::Error {
                message: format!("Unknown error kind: {}", want),
            }
        }
        (expected, actual) => TestResult::Fail {
            expected: match expected {
                Expected::Ok(want) => format!("ok: {}", want),
                Expected::Err(want) => format!("err: {}", want),
            },
            actual: match actual {
                Ok(got) => format!("ok: {}", got),
                Err(e) => format!("err: {} ({})", e.kind(), e),
            },
        },
    }
}

fn input_str<'v>(vector: &'v TestVector, field: &str) -> Result<&'v str, String> {
    vector
        .input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Missing '{}' in input", field))
}

fn input_bits(vector: &TestVector) -> Result<u64, String> {
    let hex = input_str(vector, "bits")?;
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid bits '{}': {}", hex, e))
}
