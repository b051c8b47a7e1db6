//! Scoring session: registry plus a swappable weight table

use super::registry::{RiskCategory, TagRegistry};
use super::scorer::{self, FieldRisk, RiskScore};
use super::weights::{parse_overrides, WeightTable};
use crate::domain::record::{FieldState, FieldValue, FieldView};
use crate::domain::result::Result;
use crate::domain::Record;
use std::sync::{Arc, RwLock};

/// Owns the registry and the live weight table
///
/// Scoring takes one snapshot of the table per call, so a concurrent
/// [`ScoringSession::adjust_weights`] is observed either wholly or not at all
/// by a given record's computation.
#[derive(Debug)]
pub struct ScoringSession {
    registry: Arc<TagRegistry>,
    weights: RwLock<Arc<WeightTable>>,
}

impl ScoringSession {
    pub fn new(registry: Arc<TagRegistry>, weights: WeightTable) -> Self {
        Self {
            registry,
            weights: RwLock::new(Arc::new(weights)),
        }
    }

    /// Session over the built-in registry and default weights
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            Arc::new(TagRegistry::builtin()?),
            WeightTable::default(),
        ))
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<TagRegistry> {
        Arc::clone(&self.registry)
    }

    /// Current weight table
    pub fn weights(&self) -> Arc<WeightTable> {
        let guard = self
            .weights
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Merge category multipliers into the live table
    ///
    /// Unspecified categories keep their weight. Every override is checked
    /// before anything changes; on error the table is untouched.
    ///
    /// Reported risks are rounded to [`scorer::SCORE_PRECISION`] decimals, so a
    /// field's risk scales with its weight only up to that precision.
    pub fn adjust_weights<I, K>(&self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let parsed = parse_overrides(overrides)?;
        self.adjust_category_weights(parsed)
    }

    /// Typed variant of [`ScoringSession::adjust_weights`]
    pub fn adjust_category_weights<I>(&self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (RiskCategory, f64)>,
    {
        let mut guard = self
            .weights
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = guard.merged(overrides)?;
        tracing::info!(weights = ?next, "Weight table adjusted");
        *guard = Arc::new(next);
        Ok(())
    }

    /// Score every non-sequence field present in `record`
    pub fn score_record(&self, record: &Record) -> RiskScore {
        let weights = self.weights();
        let score = scorer::score(&self.registry, &weights, record, None);
        tracing::debug!(
            total = score.total_score,
            max = score.max_score,
            risk_percentage = score.risk_percentage,
            level = %score.risk_level,
            "Record scored"
        );
        score
    }

    /// Score `record` over the identifiers of both `record` and `baseline`
    pub fn score_against(&self, record: &Record, baseline: &Record) -> RiskScore {
        let weights = self.weights();
        scorer::score(&self.registry, &weights, record, Some(baseline))
    }

    /// Pre/post scores of one transform under a single weight snapshot
    ///
    /// The post score is taken against `original` so both share a
    /// denominator.
    pub fn score_transform(&self, original: &Record, transformed: &Record) -> (RiskScore, RiskScore) {
        let weights = self.weights();
        let pre = scorer::score(&self.registry, &weights, original, None);
        let post = scorer::score(&self.registry, &weights, transformed, Some(original));
        (pre, post)
    }

    /// Score a single value under `field_id`
    pub fn score_field(&self, field_id: &str, value: Option<&FieldValue>) -> FieldRisk {
        let canonical = self.registry.canonical_id(field_id);
        let view = FieldView {
            id: field_id,
            value,
            state: FieldState::classify(value),
        };
        scorer::score_field(self.registry.lookup(&canonical), &self.weights(), &view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PhiGuardError;
    use crate::risk::scorer::RiskLevel;

    fn scenario_record() -> Record {
        let mut record = Record::new();
        record.insert("PatientName", "John^Doe");
        record.insert("PatientID", "12345");
        record
    }

    #[test]
    fn test_score_scenario_record() {
        let session = ScoringSession::with_defaults().unwrap();
        let score = session.score_record(&scenario_record());
        assert_eq!(score.total_score, 10.0);
        assert_eq!(score.max_score, 10.0);
        assert_eq!(score.risk_percentage, 100.0);
        assert_eq!(score.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_adjust_name_weight() {
        let session = ScoringSession::with_defaults().unwrap();
        let mut record = Record::new();
        record.insert("PatientName", "John^Doe");

        let before = session.score_record(&record);
        session.adjust_weights([("name", 2.0)]).unwrap();
        let after = session.score_record(&record);

        assert_eq!(before.per_field["PatientName"].risk, 5.0);
        assert_eq!(after.per_field["PatientName"].risk, 10.0);
        assert_eq!(after.per_field["PatientName"].weight, 2.0);
    }

    #[test]
    fn test_rejected_adjustment_leaves_table() {
        let session = ScoringSession::with_defaults().unwrap();
        let before = session.weights();

        let err = session
            .adjust_weights([("name", 2.0), ("date", -1.0)])
            .unwrap_err();
        assert!(matches!(err, PhiGuardError::InvalidWeight { .. }));
        assert_eq!(*session.weights(), *before);

        let err = session.adjust_weights([("email", 1.0)]).unwrap_err();
        assert!(matches!(err, PhiGuardError::UnknownCategory(_)));
    }

    #[test]
    fn test_score_field_by_tag_number() {
        let session = ScoringSession::with_defaults().unwrap();
        let value = FieldValue::from("19700101");
        let risk = session.score_field("(0010,0030)", Some(&value));
        assert_eq!(risk.category, RiskCategory::Date);
        assert_eq!(risk.base_risk, 4.0);
        assert_eq!(risk.risk, 3.2);

        let absent = session.score_field("PatientBirthDate", None);
        assert_eq!(absent.risk, 0.0);
        assert_eq!(absent.max_risk, 3.2);
    }
}
