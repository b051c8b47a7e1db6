//! Presence-based risk scoring
//!
//! `risk = presence × base_risk × weight(category)` per field, where presence
//! is 0 for absent/empty/placeholder values, [`HASH_PRESENCE_FACTOR`] for
//! keyed-hash outputs and 1 otherwise. Scoring never looks at value length or
//! content beyond those two checks, so every field stays within
//! `[0, base_risk × weight]`.

use super::registry::{RiskCategory, TagMeta, TagRegistry};
use super::weights::WeightTable;
use crate::anonymization::hashing::is_hash_output;
use crate::domain::record::{FieldState, FieldView, Record};
use crate::domain::tag::is_private_field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Presence factor of a value produced by the HASH action
pub const HASH_PRESENCE_FACTOR: f64 = 0.2;

/// Decimal places kept on every reported float
pub const SCORE_PRECISION: i32 = 4;

/// Warning text attached to private fields
pub const PRIVATE_FIELD_WARNING: &str = "UNVERIFIED - private fields may contain PHI";

/// Aggregate risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `<25` LOW, `[25,50)` MEDIUM, `[50,75)` HIGH, `>=75` CRITICAL
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 75.0 {
            RiskLevel::Critical
        } else if percentage >= 50.0 {
            RiskLevel::High
        } else if percentage >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Per-field breakdown; enough to recompute `risk` by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRisk {
    pub risk: f64,
    pub base_risk: f64,
    pub weight: f64,
    pub max_risk: f64,
    pub category: RiskCategory,
    pub state: FieldState,
    pub presence_factor: f64,
}

/// Non-fatal condition noticed while scoring
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringWarning {
    /// Identifier not in the registry; scored with defaults
    UnknownField { field: String },
    /// Odd-group tag number
    PrivateField { field: String },
    /// Nested sub-records are not scored
    SequenceNotAnalyzed { field: String },
}

impl fmt::Display for ScoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringWarning::UnknownField { field } => {
                write!(f, "{field}: not in tag registry, scored as unknown")
            }
            ScoringWarning::PrivateField { field } => write!(f, "{field}: {PRIVATE_FIELD_WARNING}"),
            ScoringWarning::SequenceNotAnalyzed { field } => {
                write!(f, "{field}: sequence not analyzed")
            }
        }
    }
}

/// Itemized risk assessment of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub total_score: f64,
    pub max_score: f64,
    pub risk_percentage: f64,
    pub risk_level: RiskLevel,
    pub per_field: BTreeMap<String, FieldRisk>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScoringWarning>,
}

impl RiskScore {
    /// Fields sorted by descending risk, ties by identifier
    pub fn ranked_fields(&self) -> Vec<(&str, &FieldRisk)> {
        let mut fields: Vec<(&str, &FieldRisk)> = self
            .per_field
            .iter()
            .map(|(id, risk)| (id.as_str(), risk))
            .collect();
        fields.sort_by(|a, b| b.1.risk.total_cmp(&a.1.risk).then_with(|| a.0.cmp(b.0)));
        fields
    }
}

/// Round to [`SCORE_PRECISION`] decimal places
///
/// Values too large to scale are already integral and come back unchanged.
pub fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_PRECISION);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Presence factor of a classified value
pub fn presence_factor(state: FieldState, normalized: Option<&str>) -> f64 {
    match state {
        FieldState::Absent | FieldState::Empty => 0.0,
        FieldState::Present => match normalized {
            Some(value) if is_hash_output(value) => HASH_PRESENCE_FACTOR,
            _ => 1.0,
        },
    }
}

/// Score one classified field
pub fn score_field(meta: TagMeta, weights: &WeightTable, view: &FieldView<'_>) -> FieldRisk {
    let weight = weights.weight(meta.category);
    let normalized = view.normalized();
    let presence = presence_factor(view.state, normalized.as_deref());
    let max_risk = meta.base_risk * weight;

    FieldRisk {
        risk: round_score(presence * max_risk),
        base_risk: round_score(meta.base_risk),
        weight: round_score(weight),
        max_risk: round_score(max_risk),
        category: meta.category,
        state: view.state,
        presence_factor: presence,
    }
}

/// Score `record`, optionally against the identifiers of `baseline`
///
/// Without a baseline every non-sequence field of `record` is considered.
/// With one, identifiers only the baseline carries are added with
/// `risk = 0` and their full `max_risk`, so two scores of the same baseline
/// share a denominator.
pub(crate) fn score(
    registry: &TagRegistry,
    weights: &WeightTable,
    record: &Record,
    baseline: Option<&Record>,
) -> RiskScore {
    let mut per_field = BTreeMap::new();
    let mut warnings = Vec::new();

    for (id, view) in registry.canonical_views(record) {
        if view.is_sequence() {
            tracing::debug!(field = %id, "Sequence field not analyzed");
            warnings.push(ScoringWarning::SequenceNotAnalyzed { field: id });
            continue;
        }
        note_unregistered(registry, &id, &mut warnings);
        let risk = score_field(registry.lookup(&id), weights, &view);
        per_field.insert(id, risk);
    }

    if let Some(baseline) = baseline {
        for (id, view) in registry.canonical_views(baseline) {
            if view.is_sequence() || per_field.contains_key(&id) {
                continue;
            }
            note_unregistered(registry, &id, &mut warnings);
            let absent = FieldView {
                id: view.id,
                value: None,
                state: FieldState::Absent,
            };
            let risk = score_field(registry.lookup(&id), weights, &absent);
            per_field.insert(id, risk);
        }
    }

    warnings.sort();
    warnings.dedup();

    let total: f64 = per_field.values().map(|f| f.risk).sum();
    let max: f64 = per_field.values().map(|f| f.max_risk).sum();
    let total_score = round_score(total);
    let max_score = round_score(max);

    let risk_percentage = percentage(&per_field, total_score, max_score);

    RiskScore {
        total_score,
        max_score,
        risk_percentage,
        risk_level: RiskLevel::from_percentage(risk_percentage),
        per_field,
        warnings,
    }
}

/// `total / max × 100`, clamped to `[0, 100]`
///
/// When the sums overflow, every field is divided by the largest `max_risk`
/// first so the ratio stays defined.
fn percentage(per_field: &BTreeMap<String, FieldRisk>, total_score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        return 0.0;
    }
    let mut ratio = total_score / max_score;
    if !ratio.is_finite() {
        let scale = per_field.values().map(|f| f.max_risk).fold(0.0, f64::max);
        let total: f64 = per_field.values().map(|f| f.risk / scale).sum();
        let max: f64 = per_field.values().map(|f| f.max_risk / scale).sum();
        ratio = total / max;
    }
    round_score((ratio * 100.0).clamp(0.0, 100.0))
}

fn note_unregistered(registry: &TagRegistry, id: &str, warnings: &mut Vec<ScoringWarning>) {
    if registry.is_known(id) {
        return;
    }
    if is_private_field(id) {
        tracing::warn!(field = %id, "{PRIVATE_FIELD_WARNING}");
        warnings.push(ScoringWarning::PrivateField {
            field: id.to_string(),
        });
    } else {
        tracing::debug!(field = %id, "Field not in tag registry, scoring as unknown");
        warnings.push(ScoringWarning::UnknownField {
            field: id.to_string(),
        });
    }
}
