//! Human-readable risk report

use super::registry::TagRegistry;
use super::scorer::RiskScore;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Render a score, fields sorted by descending risk
pub fn render_risk_score(score: &RiskScore, registry: &TagRegistry) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "PHI RISK ASSESSMENT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Risk Level: {}", score.risk_level);
    let _ = writeln!(
        out,
        "Risk Score: {:.2} / {:.2}",
        score.total_score, score.max_score
    );
    let _ = writeln!(out, "Risk Percentage: {:.1}%", score.risk_percentage);

    if !score.per_field.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Field Risks:");
        for (id, field) in score.ranked_fields() {
            let _ = writeln!(
                out,
                "  {id} ({}) [cat={}, base={:.1}, weight={:.2}, max={:.2}]: {:.2}",
                registry.display_name(id),
                field.category,
                field.base_risk,
                field.weight,
                field.max_risk,
                field.risk
            );
        }
    }

    if !score.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings:");
        for warning in &score.warnings {
            let _ = writeln!(out, "  ! {warning}");
        }
    }

    let _ = write!(out, "{rule}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::risk::ScoringSession;

    #[test]
    fn test_render_orders_by_risk() {
        let session = ScoringSession::with_defaults().unwrap();
        let mut record = Record::new();
        record.insert("StudyTime", "093000");
        record.insert("PatientName", "Doe^Jane");
        let score = session.score_record(&record);

        let text = render_risk_score(&score, session.registry());
        let name_pos = text.find("PatientName (Patient's Name)").unwrap();
        let time_pos = text.find("StudyTime (Study Time)").unwrap();
        assert!(name_pos < time_pos);
        assert!(text.contains("Risk Level: CRITICAL"));
        assert!(text.contains("[cat=name, base=5.0, weight=1.00, max=5.00]: 5.00"));
    }

    #[test]
    fn test_render_lists_warnings() {
        let session = ScoringSession::with_defaults().unwrap();
        let mut record = Record::new();
        record.insert("(0029,1010)", "vendor");
        let text = render_risk_score(&session.score_record(&record), session.registry());
        assert!(text.contains("UNVERIFIED - private fields may contain PHI"));
    }
}
