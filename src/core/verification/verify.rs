//! Action log vs. delta cross-check
//!
//! For every field a policy names, the last log entry decides what the delta
//! must show:
//!
//! - applied REMOVE: `removed`
//! - applied EMPTY, HASH, REPLACE: `changed` or `unchanged`
//! - unchanged_empty: `changed` or `unchanged`
//! - not_present: anything but `added`
//! - skipped_sequence: skipped
//!
//! Sequence fields have no transition; only their before/after states are
//! known. An applied REMOVE must leave them absent, a not_present rule must
//! not find them added, and anything else on a sequence is skipped.

use super::report::{VerificationFailure, VerificationReport};
use crate::anonymization::engine::{ActionLogEntry, ActionOutcome};
use crate::diff::{Delta, NotAnalyzed, Transition};
use std::collections::BTreeMap;

pub fn verify_log_against_delta(log: &[ActionLogEntry], delta: &Delta) -> VerificationReport {
    let mut last_per_field: BTreeMap<&str, &ActionLogEntry> = BTreeMap::new();
    for entry in log {
        last_per_field.insert(entry.field.as_str(), entry);
    }

    let mut report = VerificationReport::new();

    for (field, entry) in last_per_field {
        if entry.outcome == ActionOutcome::SkippedSequence {
            report.record_skip();
            continue;
        }

        if let Some(sequence) = delta.sequence(field) {
            match sequence_failure(entry, sequence) {
                None if sequence_checked(entry) => report.record_pass(),
                None => report.record_skip(),
                Some(reason) => {
                    tracing::warn!(field, action = %entry.action, %reason, "Verification failed");
                    report.record_failure(VerificationFailure {
                        field: field.to_string(),
                        action: entry.action.clone(),
                        outcome: entry.outcome,
                        transition: None,
                        reason,
                    });
                }
            }
            continue;
        }

        let transition = delta.transition(field);
        match expectation_failure(entry, transition) {
            None => report.record_pass(),
            Some(reason) => {
                tracing::warn!(field, action = %entry.action, %reason, "Verification failed");
                report.record_failure(VerificationFailure {
                    field: field.to_string(),
                    action: entry.action.clone(),
                    outcome: entry.outcome,
                    transition,
                    reason,
                });
            }
        }
    }

    report
}

fn sequence_checked(entry: &ActionLogEntry) -> bool {
    matches!(
        (entry.outcome, entry.action.as_str()),
        (ActionOutcome::Applied, "REMOVE") | (ActionOutcome::NotPresent, _)
    )
}

fn sequence_failure(entry: &ActionLogEntry, sequence: &NotAnalyzed) -> Option<String> {
    match (entry.outcome, entry.action.as_str()) {
        (ActionOutcome::Applied, "REMOVE") if !sequence.after_state.is_absent() => Some(format!(
            "REMOVE applied but sequence is still {}",
            sequence.after_state
        )),
        (ActionOutcome::NotPresent, _) if !sequence.after_state.is_absent() => {
            Some("sequence added although the field was not present".to_string())
        }
        _ => None,
    }
}

fn expectation_failure(entry: &ActionLogEntry, transition: Option<Transition>) -> Option<String> {
    let Some(transition) = transition else {
        return match entry.outcome {
            ActionOutcome::NotPresent => None,
            _ => Some("field missing from delta".to_string()),
        };
    };

    let ok = match (entry.outcome, entry.action.as_str()) {
        (ActionOutcome::Applied, "REMOVE") => transition == Transition::Removed,
        (ActionOutcome::Applied, _) | (ActionOutcome::UnchangedEmpty, _) => {
            matches!(transition, Transition::Changed | Transition::Unchanged)
        }
        (ActionOutcome::NotPresent, _) => transition != Transition::Added,
        (ActionOutcome::SkippedSequence, _) => true,
    };

    if ok {
        None
    } else {
        Some(format!(
            "{} {} but delta shows {transition}",
            entry.action, entry.outcome
        ))
    }
}
