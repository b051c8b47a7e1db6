//! Compliance accounting
//!
//! Counts the PHI fields of the original record (non-zero base risk,
//! non-sequence) and how many of them no longer carry a plaintext value after
//! the transform. A field counts as processed when its post-transform
//! presence factor is below 1: removed, emptied, a placeholder, or a hash
//! output.

use crate::domain::record::Record;
use crate::risk::registry::TagRegistry;
use crate::risk::scorer::{presence_factor, round_score};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Compliance summary of one anonymization pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub total_phi_fields: usize,
    pub processed: usize,
    pub remaining: usize,
    pub compliance_percentage: f64,
    pub remaining_fields: Vec<String>,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.remaining == 0
    }
}

/// Compare `transformed` with `original` field by field
pub fn assess(registry: &TagRegistry, original: &Record, transformed: &Record) -> ComplianceReport {
    let after = registry.canonical_views(transformed);

    let mut total_phi_fields = 0;
    let mut processed = 0;
    let mut remaining_fields = Vec::new();

    for (id, view) in registry.canonical_views(original) {
        if view.is_sequence() || !registry.lookup(&id).is_phi() {
            continue;
        }
        total_phi_fields += 1;

        let factor = match after.get(&id) {
            Some(post) => presence_factor(post.state, post.normalized().as_deref()),
            None => 0.0,
        };

        if factor < 1.0 {
            processed += 1;
        } else {
            tracing::debug!(field = %id, "PHI field still present after transform");
            remaining_fields.push(id);
        }
    }

    remaining_fields.sort();
    let compliance_percentage = if total_phi_fields == 0 {
        100.0
    } else {
        round_score(processed as f64 / total_phi_fields as f64 * 100.0)
    };

    ComplianceReport {
        total_phi_fields,
        processed,
        remaining: total_phi_fields - processed,
        compliance_percentage,
        remaining_fields,
    }
}

/// Human-readable compliance report
pub fn render_compliance(report: &ComplianceReport, registry: &TagRegistry) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "COMPLIANCE REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total PHI Fields: {}", report.total_phi_fields);
    let _ = writeln!(out, "Processed: {}", report.processed);
    let _ = writeln!(out, "Remaining: {}", report.remaining);
    let _ = writeln!(out, "Compliance: {:.1}%", report.compliance_percentage);

    if !report.remaining_fields.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Remaining PHI Fields:");
        for field in &report.remaining_fields {
            let _ = writeln!(out, "  - {field} ({})", registry.display_name(field));
        }
    }

    let _ = write!(out, "{rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TagRegistry {
        TagRegistry::builtin().unwrap()
    }

    #[test]
    fn test_no_phi_is_fully_compliant() {
        let mut record = Record::new();
        record.insert("PatientSex", "F");
        record.insert("Modality", "CT");
        let report = assess(&registry(), &record, &record);
        assert_eq!(report.total_phi_fields, 0);
        assert_eq!(report.compliance_percentage, 100.0);
        assert!(report.is_compliant());
    }

    #[test]
    fn test_unprocessed_field_remains() {
        let mut original = Record::new();
        original.insert("PatientName", "Doe^John");
        original.insert("StudyDate", "20240101");
        let mut transformed = original.clone();
        transformed.remove("PatientName");

        let report = assess(&registry(), &original, &transformed);
        assert_eq!(report.total_phi_fields, 2);
        assert_eq!(report.processed, 1);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.compliance_percentage, 50.0);
        assert_eq!(report.remaining_fields, vec!["StudyDate".to_string()]);
    }

    #[test]
    fn test_placeholder_replacement_counts_as_processed() {
        let mut original = Record::new();
        original.insert("PatientName", "Doe^John");
        let mut transformed = Record::new();
        transformed.insert("PatientName", "ANONYMOUS");

        let report = assess(&registry(), &original, &transformed);
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn test_sensitive_replacement_remains() {
        let mut original = Record::new();
        original.insert("PatientName", "Doe^John");
        let mut transformed = Record::new();
        transformed.insert("PatientName", "Smith^Jane");

        let report = assess(&registry(), &original, &transformed);
        assert_eq!(report.remaining, 1);
    }

    #[test]
    fn test_render_names_remaining_fields() {
        let mut original = Record::new();
        original.insert("AccessionNumber", "A-1");
        let report = assess(&registry(), &original, &original);
        let text = render_compliance(&report, &registry());
        assert!(text.contains("AccessionNumber (Accession Number)"));
        assert!(text.contains("Compliance: 0.0%"));
    }
}
