//! Conformance testing.
//!
//! Two complementary checks:
//!
//! - [`corpus`] runs hand-written test vectors (parse, number encoding, bit
//!   decoding) from a JSON corpus file and compares results exactly.
//! - [`DiffTestHarness`] parses documents with both this crate and
//!   `serde_json` and reports every disagreement. Rejections that only this
//!   crate makes (inexact numbers, repeated keys, limits) are expected and
//!   counted separately.

pub mod corpus;
mod harness;
mod repro;

pub use corpus::{Corpus, CorpusResults, CorpusRunner, Expected, TestResult, TestVector};
pub use harness::{BatchResult, DiffResult, DiffTestHarness, FailureDetail, Outcome};
pub use repro::ReproBundle;

use thiserror::Error;

/// Result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors that can occur while loading or running conformance inputs.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// A file or directory could not be read.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path involved
        path: String,
        /// Underlying error
        message: String,
    },
    /// The corpus file is not in the expected format.
    #[error("Failed to parse corpus JSON: {0}")]
    CorpusFormat(String),
}

impl ConformanceError {
    fn io(path: &std::path::Path, error: std::io::Error) -> Self {
        ConformanceError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}
