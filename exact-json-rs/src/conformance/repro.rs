//! Reproduction bundle for debugging parser disagreements.

use super::harness::Outcome;
use crate::json::{stringify, Map, Value};
use std::path::Path;

/// Longest document excerpt kept in a report.
const EXCERPT_LIMIT: usize = 4096;

/// A bundle of information for reproducing a disagreement.
#[derive(Debug, Clone)]
pub struct ReproBundle {
    /// Test name that failed.
    pub test_name: String,
    /// The document, lossily decoded as UTF-8.
    pub document: String,
    /// This crate's outcome.
    pub ours: Outcome,
    /// `serde_json`'s outcome.
    pub reference: Outcome,
}

impl ReproBundle {
    /// Create a new repro bundle.
    pub fn new(test_name: String, document: String, ours: Outcome, reference: Outcome) -> Self {
        Self {
            test_name,
            document,
            ours,
            reference,
        }
    }

    fn excerpt(&self) -> &str {
        match self.document.char_indices().nth(EXCERPT_LIMIT) {
            Some((end, _)) => &self.document[..end],
            None => &self.document,
        }
    }

    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        format!(
            r#"=== Parser Disagreement Report ===
Test: {}
Document ({} bytes): {}

exact-json: {:?}
serde_json: {:?}

To reproduce:
  exact-json check {}
"#,
            self.test_name,
            self.document.len(),
            self.excerpt(),
            self.ours,
            self.reference,
            self.test_name,
        )
    }

    /// Save the repro bundle to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_report())
    }

    /// Format as canonical JSON for machine parsing.
    pub fn to_json(&self) -> String {
        let bundle: Value = [
            ("test_name", Value::from(self.test_name.as_str())),
            ("document", Value::from(self.excerpt())),
            ("ours", outcome_value(&self.ours)),
            ("reference", outcome_value(&self.reference)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        // Strings, objects and a fixed depth of 2 always encode.
        stringify(&bundle).unwrap_or_default()
    }
}

fn outcome_value(outcome: &Outcome) -> Value {
    let tag = if outcome.is_ok() { "ok" } else { "err" };
    let mut map = Map::new();
    map.insert(tag.to_string(), Value::from(outcome.as_string()));
    Value::Object(map)
}
