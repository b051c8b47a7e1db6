//! Action engine
//!
//! Applies a [`Policy`] to a record and returns the transformed copy, the
//! [`ComplianceReport`] and an ordered action log. The input record is never
//! mutated; every structural check (policy validity, salt availability)
//! happens before the first rule runs.
//!
//! # Examples
//!
//! ```
//! use phi_guard::anonymization::{ActionEngine, DigestAlgorithm, KeyedHasher, Policy, Rule};
//! use phi_guard::config::secret_salt;
//! use phi_guard::domain::Record;
//! use phi_guard::risk::TagRegistry;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TagRegistry::builtin().unwrap());
//! let hasher = KeyedHasher::new(secret_salt("s".to_string()), DigestAlgorithm::Sha256);
//! let engine = ActionEngine::new(registry, Some(hasher));
//!
//! let mut record = Record::new();
//! record.insert("PatientName", "John^Doe");
//! record.insert("PatientID", "12345");
//!
//! let policy = Policy::new(
//!     "scenario",
//!     vec![Rule::remove("PatientName"), Rule::hash("PatientID")],
//! )
//! .unwrap();
//! let result = engine.apply(&record, &policy).unwrap();
//!
//! assert!(!result.record.contains("PatientName"));
//! assert_eq!(result.compliance.compliance_percentage, 100.0);
//! ```

use super::action::Action;
use super::compliance::{self, ComplianceReport};
use super::hashing::KeyedHasher;
use super::policy::Policy;
use crate::domain::errors::PhiGuardError;
use crate::domain::record::{FieldState, FieldValue, Record};
use crate::domain::result::Result;
use crate::risk::registry::TagRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What happened when a rule ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action changed the record
    Applied,
    /// The field was not in the record; nothing was created
    NotPresent,
    /// Sequence field; only REMOVE acts on sequences
    SkippedSequence,
    /// HASH or EMPTY on an already-empty field
    UnchangedEmpty,
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Applied => write!(f, "applied"),
            ActionOutcome::NotPresent => write!(f, "not_present"),
            ActionOutcome::SkippedSequence => write!(f, "skipped_sequence"),
            ActionOutcome::UnchangedEmpty => write!(f, "unchanged_empty"),
        }
    }
}

/// One entry per rule, in policy order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Canonical field identifier
    pub field: String,
    pub action: String,
    pub outcome: ActionOutcome,
    pub before: FieldState,
    pub after: FieldState,
}

/// Result of [`ActionEngine::apply`]
#[derive(Debug, Clone)]
pub struct Anonymized {
    pub record: Record,
    pub compliance: ComplianceReport,
    pub log: Vec<ActionLogEntry>,
}

/// Rule-driven record transformer
#[derive(Debug)]
pub struct ActionEngine {
    registry: Arc<TagRegistry>,
    hasher: Option<KeyedHasher>,
}

impl ActionEngine {
    /// `hasher` may be `None` for policies without HASH rules
    pub fn new(registry: Arc<TagRegistry>, hasher: Option<KeyedHasher>) -> Self {
        Self { registry, hasher }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Apply `policy` to a copy of `record`
    ///
    /// # Errors
    ///
    /// - [`PhiGuardError::InvalidPolicy`] if any rule is invalid
    /// - [`PhiGuardError::Configuration`] if the policy hashes but no salt
    ///   was configured
    ///
    /// Data-shape conditions (missing fields, sequences) are never errors;
    /// they show up in the action log.
    pub fn apply(&self, record: &Record, policy: &Policy) -> Result<Anonymized> {
        policy.validate()?;
        if policy.contains_hash() && self.hasher.is_none() {
            return Err(PhiGuardError::Configuration(format!(
                "policy '{}' contains HASH rules but no salt is configured",
                policy.name()
            )));
        }

        let mut transformed = record.clone();
        let mut log = Vec::with_capacity(policy.len());

        for rule in policy.rules() {
            let canonical = self.registry.canonical_id(&rule.field);
            let keys: Vec<String> = self
                .registry
                .matching_keys(&transformed, &canonical)
                .into_iter()
                .map(str::to_string)
                .collect();

            if keys.is_empty() {
                tracing::debug!(field = %canonical, action = %rule.action, "Field not present, rule is a no-op");
                log.push(ActionLogEntry {
                    field: canonical,
                    action: rule.action.name().to_string(),
                    outcome: ActionOutcome::NotPresent,
                    before: FieldState::Absent,
                    after: FieldState::Absent,
                });
                continue;
            }

            // Every spelling of the field is transformed
            let before = strongest_state(&transformed, &keys);
            let mut outcomes = Vec::with_capacity(keys.len());
            for key in &keys {
                let key_before = transformed.field(key).state;
                outcomes.push(self.apply_action(&mut transformed, key, &rule.action, key_before)?);
            }
            let outcome = outcomes
                .iter()
                .copied()
                .find(|o| *o == ActionOutcome::Applied)
                .or_else(|| outcomes.first().copied())
                .unwrap_or(ActionOutcome::NotPresent);
            let after = strongest_state(&transformed, &keys);

            tracing::debug!(
                field = %canonical,
                action = %rule.action,
                outcome = %outcome,
                before = %before,
                after = %after,
                "Rule applied"
            );

            log.push(ActionLogEntry {
                field: canonical,
                action: rule.action.name().to_string(),
                outcome,
                before,
                after,
            });
        }

        let compliance = compliance::assess(&self.registry, record, &transformed);
        tracing::info!(
            policy = policy.name(),
            rules = policy.len(),
            total_phi_fields = compliance.total_phi_fields,
            processed = compliance.processed,
            remaining = compliance.remaining,
            "Policy applied"
        );

        Ok(Anonymized {
            record: transformed,
            compliance,
            log,
        })
    }

    fn apply_action(
        &self,
        record: &mut Record,
        key: &str,
        action: &Action,
        before: FieldState,
    ) -> Result<ActionOutcome> {
        if record.is_sequence(key) && *action != Action::Remove {
            tracing::warn!(field = %key, action = %action, "Only REMOVE acts on sequence fields; rule skipped");
            return Ok(ActionOutcome::SkippedSequence);
        }

        match action {
            Action::Remove => {
                record.remove(key);
                Ok(ActionOutcome::Applied)
            }
            Action::Empty | Action::Hash if before == FieldState::Empty => {
                Ok(ActionOutcome::UnchangedEmpty)
            }
            Action::Empty => {
                record.insert(key, FieldValue::Text(String::new()));
                Ok(ActionOutcome::Applied)
            }
            Action::Hash => {
                let hasher = self.hasher.as_ref().ok_or_else(|| {
                    PhiGuardError::Configuration("HASH requires a salt".to_string())
                })?;
                let value = record.field(key).normalized().unwrap_or_default();
                let digest = hasher.digest(&value)?;
                record.insert(key, FieldValue::Text(digest));
                Ok(ActionOutcome::Applied)
            }
            Action::Replace(value) => {
                record.insert(key, FieldValue::Text(value.clone()));
                Ok(ActionOutcome::Applied)
            }
        }
    }
}

/// Strongest state over several spellings of one field
fn strongest_state(record: &Record, keys: &[String]) -> FieldState {
    keys.iter()
        .map(|key| record.field(key).state)
        .max()
        .unwrap_or(FieldState::Absent)
}
