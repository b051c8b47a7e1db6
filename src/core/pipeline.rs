//! End-to-end privacy audit
//!
//! pre-score → apply policy → post-score (against the original) → diff →
//! verify the action log against the diff.

use super::verification::{verify_log_against_delta, VerificationReport};
use crate::anonymization::audit::AuditRun;
use crate::anonymization::compliance::ComplianceReport;
use crate::anonymization::engine::{ActionEngine, ActionLogEntry};
use crate::anonymization::hashing::KeyedHasher;
use crate::anonymization::policy::Policy;
use crate::diff::{Delta, DiffEngine};
use crate::domain::record::Record;
use crate::domain::result::Result;
use crate::risk::scorer::{round_score, RiskScore};
use crate::risk::session::ScoringSession;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Everything one audit run produced
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub policy: String,
    pub pre: RiskScore,
    pub post: RiskScore,
    pub compliance: ComplianceReport,
    pub delta: Delta,
    pub log: Vec<ActionLogEntry>,
    pub verification: VerificationReport,
    pub duration_ms: u64,
    /// The transformed record
    #[serde(skip_serializing)]
    pub record: Record,
}

impl AuditReport {
    /// Percentage points of risk removed by the policy
    pub fn risk_reduction(&self) -> f64 {
        round_score(self.pre.risk_percentage - self.post.risk_percentage)
    }

    /// Compliant and verified
    pub fn passed(&self) -> bool {
        self.compliance.is_compliant() && self.verification.is_success()
    }

    /// Audit trail view of this run
    pub fn audit_run<'a>(&'a self, policy: &'a Policy, original: &'a Record) -> AuditRun<'a> {
        AuditRun {
            policy,
            original,
            log: &self.log,
            compliance: &self.compliance,
            pre: &self.pre,
            post: &self.post,
        }
    }
}

/// Scorer, action engine and diff over one registry
pub struct PrivacyAudit {
    session: Arc<ScoringSession>,
    engine: ActionEngine,
    diff: DiffEngine,
}

impl PrivacyAudit {
    pub fn new(session: Arc<ScoringSession>, hasher: Option<KeyedHasher>) -> Self {
        let registry = session.shared_registry();
        Self {
            engine: ActionEngine::new(Arc::clone(&registry), hasher),
            diff: DiffEngine::new(registry),
            session,
        }
    }

    pub fn session(&self) -> &ScoringSession {
        &self.session
    }

    pub fn engine(&self) -> &ActionEngine {
        &self.engine
    }

    pub fn diff(&self) -> &DiffEngine {
        &self.diff
    }

    /// Run the full audit of `policy` on `record`
    ///
    /// Fails only for structurally invalid input (see
    /// [`ActionEngine::apply`]); `record` is never modified.
    pub fn run(&self, record: &Record, policy: &Policy) -> Result<AuditReport> {
        let start = Instant::now();

        let anonymized = self.engine.apply(record, policy)?;
        let (pre, post) = self.session.score_transform(record, &anonymized.record);
        let delta = self.diff.compare(record, &anonymized.record);
        let verification = verify_log_against_delta(&anonymized.log, &delta);

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            policy = policy.name(),
            pre_risk = pre.risk_percentage,
            post_risk = post.risk_percentage,
            compliance = anonymized.compliance.compliance_percentage,
            verified = verification.is_success(),
            duration_ms,
            "Privacy audit complete"
        );

        Ok(AuditReport {
            policy: policy.name().to_string(),
            pre,
            post,
            compliance: anonymized.compliance,
            delta,
            log: anonymized.log,
            verification,
            duration_ms,
            record: anonymized.record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::action::Rule;
    use crate::anonymization::hashing::DigestAlgorithm;
    use crate::config::secret::secret_salt;
    use crate::diff::Transition;
    use crate::risk::scorer::RiskLevel;

    fn audit() -> PrivacyAudit {
        PrivacyAudit::new(
            Arc::new(ScoringSession::with_defaults().unwrap()),
            Some(KeyedHasher::new(
                secret_salt("s".to_string()),
                DigestAlgorithm::Sha256,
            )),
        )
    }

    #[test]
    fn test_scenario_run() {
        let mut record = Record::new();
        record.insert("PatientName", "John^Doe");
        record.insert("PatientID", "12345");
        let policy = Policy::new(
            "scenario",
            vec![Rule::remove("PatientName"), Rule::hash("PatientID")],
        )
        .unwrap();

        let report = audit().run(&record, &policy).unwrap();
        assert_eq!(report.pre.risk_level, RiskLevel::Critical);
        assert_eq!(report.post.total_score, 1.0);
        assert_eq!(report.post.max_score, 10.0);
        assert_eq!(report.post.risk_percentage, 10.0);
        assert_eq!(report.post.risk_level, RiskLevel::Low);
        assert_eq!(report.risk_reduction(), 90.0);
        assert_eq!(report.delta.transition("PatientName"), Some(Transition::Removed));
        assert_eq!(report.delta.transition("PatientID"), Some(Transition::Changed));
        assert!(report.verification.is_success());
        assert!(report.passed());
    }

    #[test]
    fn test_report_serializes_without_record() {
        let mut record = Record::new();
        record.insert("PatientName", "John^Doe");
        let policy = Policy::new("p", vec![Rule::remove("PatientName")]).unwrap();

        let report = audit().run(&record, &policy).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("record").is_none());
        assert_eq!(json["compliance"]["compliance_percentage"], 100.0);
        assert_eq!(json["pre"]["risk_level"], "CRITICAL");
    }
}
