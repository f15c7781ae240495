//! Shared data models: normalized lockfile records and validation results.

pub mod lockfile;

pub use lockfile::{DependencyRecord, LockfileDocument, LockfileType};

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A record rejected by a validator, with the reason shown to users.
pub struct Offense {
    pub record: DependencyRecord,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Result of running one validator over a lockfile.
pub struct ValidationOutcome {
    pub validator: String,
    pub passed: bool,
    pub offenses: Vec<Offense>,
}

impl ValidationOutcome {
    /// Build an outcome; `passed` is derived from the absence of offenses.
    pub fn from_offenses(validator: &str, offenses: Vec<Offense>) -> Self {
        ValidationOutcome {
            validator: validator.to_string(),
            passed: offenses.is_empty(),
            offenses,
        }
    }

    pub fn offending_records(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.offenses.iter().map(|o| &o.record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Aggregated result for one lockfile path.
pub struct RunSummary {
    pub path: PathBuf,
    pub validator_count: usize,
    pub validator_successes: usize,
    pub validator_failures: usize,
    pub outcomes: Vec<ValidationOutcome>,
}

impl RunSummary {
    pub fn new(path: PathBuf) -> Self {
        RunSummary {
            path,
            validator_count: 0,
            validator_successes: 0,
            validator_failures: 0,
            outcomes: Vec::new(),
        }
    }

    /// Fold one outcome into the counters.
    pub fn record(&mut self, outcome: ValidationOutcome) {
        self.validator_count += 1;
        if outcome.passed {
            self.validator_successes += 1;
        } else {
            self.validator_failures += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn is_success(&self) -> bool {
        self.validator_failures == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_stay_consistent() {
        let mut s = RunSummary::new(PathBuf::from("yarn.lock"));
        s.record(ValidationOutcome::from_offenses("validateHttps", vec![]));
        s.record(ValidationOutcome::from_offenses(
            "validateIntegrity",
            vec![Offense {
                record: DependencyRecord::new("y"),
                message: "missing".into(),
            }],
        ));
        assert_eq!(s.validator_count, 2);
        assert_eq!(s.validator_successes, 1);
        assert_eq!(s.validator_failures, 1);
        assert_eq!(
            s.validator_count,
            s.validator_successes + s.validator_failures
        );
        assert!(!s.is_success());
        assert_eq!(s.outcomes[1].offending_records().count(), 1);
    }
}
