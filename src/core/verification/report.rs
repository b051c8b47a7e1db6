//! Verification report structures
//!
//! Result of cross-checking the action log against the delta.

use crate::anonymization::engine::ActionOutcome;
use crate::diff::Transition;
use serde::{Deserialize, Serialize};

/// Outcome of checking every logged field against the delta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Fields checked (one per field named by the policy)
    pub total_checked: usize,
    pub passed: usize,
    pub failed: usize,
    /// Sequence fields; the diff does not analyze them
    pub skipped: usize,
    pub failures: Vec<VerificationFailure>,
}

/// A logged action the delta does not agree with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub field: String,
    pub action: String,
    pub outcome: ActionOutcome,
    /// `None` when the delta has no entry for the field
    pub transition: Option<Transition>,
    pub reason: String,
}

impl VerificationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self) {
        self.total_checked += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, failure: VerificationFailure) {
        self.total_checked += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    pub fn record_skip(&mut self) {
        self.total_checked += 1;
        self.skipped += 1;
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Verification\n");
        summary.push_str(&format!("  Checked: {}\n", self.total_checked));
        summary.push_str(&format!("  Passed: {}\n", self.passed));
        summary.push_str(&format!("  Failed: {}\n", self.failed));
        summary.push_str(&format!("  Skipped: {}\n", self.skipped));

        for (i, failure) in self.failures.iter().enumerate() {
            summary.push_str(&format!(
                "  {}. {} {} ({}): {}\n",
                i + 1,
                failure.action,
                failure.field,
                failure.outcome,
                failure.reason
            ));
        }

        summary
    }
}
