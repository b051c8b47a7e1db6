//! Audit logger for anonymization runs

use crate::anonymization::compliance::ComplianceReport;
use crate::anonymization::engine::{ActionLogEntry, ActionOutcome};
use crate::anonymization::policy::Policy;
use crate::domain::errors::PhiGuardError;
use crate::domain::record::Record;
use crate::domain::result::Result;
use crate::risk::registry::TagRegistry;
use crate::risk::scorer::{RiskLevel, RiskScore};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Audit log entry, one per run
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    run_id: String,
    policy: String,
    rules: Vec<AuditRuleOutcome>,
    compliance: ComplianceReport,
    pre_risk: AuditRisk,
    post_risk: AuditRisk,
}

/// Rule outcome with the original value fingerprinted
#[derive(Debug, Serialize)]
struct AuditRuleOutcome {
    field: String,
    action: String,
    outcome: ActionOutcome,
    /// SHA-256 of the original value (never log plaintext PHI)
    #[serde(skip_serializing_if = "Option::is_none")]
    value_fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuditRisk {
    total_score: f64,
    max_score: f64,
    risk_percentage: f64,
    risk_level: RiskLevel,
}

impl From<&RiskScore> for AuditRisk {
    fn from(score: &RiskScore) -> Self {
        Self {
            total_score: score.total_score,
            max_score: score.max_score,
            risk_percentage: score.risk_percentage,
            risk_level: score.risk_level,
        }
    }
}

/// Everything one run contributes to the audit trail
pub struct AuditRun<'a> {
    pub policy: &'a Policy,
    pub original: &'a Record,
    pub log: &'a [ActionLogEntry],
    pub compliance: &'a ComplianceReport,
    pub pre: &'a RiskScore,
    pub post: &'a RiskScore,
}

/// Append-only audit trail
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PhiGuardError::Io(format!(
                        "Failed to create audit log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    pub fn disabled() -> Self {
        Self {
            log_path: PathBuf::new(),
            json_format: true,
            enabled: false,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Append one run; returns its run id (nil when disabled)
    pub fn log_run(&self, registry: &TagRegistry, run: &AuditRun<'_>) -> Result<Uuid> {
        if !self.enabled {
            return Ok(Uuid::nil());
        }

        let run_id = Uuid::new_v4();
        let originals = registry.canonical_views(run.original);
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: run_id.to_string(),
            policy: run.policy.name().to_string(),
            rules: run
                .log
                .iter()
                .map(|entry| AuditRuleOutcome {
                    field: entry.field.clone(),
                    action: entry.action.clone(),
                    outcome: entry.outcome,
                    value_fingerprint: originals
                        .get(&entry.field)
                        .and_then(|view| view.normalized())
                        .filter(|value| !value.is_empty())
                        .map(|value| fingerprint(&value)),
                })
                .collect(),
            compliance: run.compliance.clone(),
            pre_risk: run.pre.into(),
            post_risk: run.post.into(),
        };

        self.write_entry(&entry)?;
        tracing::debug!(run_id = %run_id, path = %self.log_path.display(), "Audit entry written");
        Ok(run_id)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                PhiGuardError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        if self.json_format {
            let json_line = serde_json::to_string(entry)?;
            writeln!(file, "{json_line}")?;
        } else {
            writeln!(
                file,
                "[{}] Run: {} | Policy: {} | Rules: {} | Compliance: {:.1}% | Risk: {:.1}% -> {:.1}%",
                entry.timestamp,
                entry.run_id,
                entry.policy,
                entry.rules.len(),
                entry.compliance.compliance_percentage,
                entry.pre_risk.risk_percentage,
                entry.post_risk.risk_percentage
            )?;
        }

        Ok(())
    }
}

/// Unkeyed SHA-256 of a value
fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::action::Rule;
    use crate::anonymization::engine::ActionEngine;
    use crate::anonymization::hashing::{DigestAlgorithm, KeyedHasher};
    use crate::config::secret::secret_salt;
    use crate::risk::ScoringSession;
    use tempfile::tempdir;

    fn run_and_log(logger: &AuditLogger) -> Uuid {
        let session = ScoringSession::with_defaults().unwrap();
        let engine = ActionEngine::new(
            session.shared_registry(),
            Some(KeyedHasher::new(
                secret_salt("s".to_string()),
                DigestAlgorithm::Sha256,
            )),
        );
        let mut record = Record::new();
        record.insert("PatientName", "John^Doe");
        record.insert("PatientID", "12345");
        let policy = Policy::new(
            "scenario",
            vec![Rule::remove("PatientName"), Rule::hash("PatientID")],
        )
        .unwrap();

        let result = engine.apply(&record, &policy).unwrap();
        let pre = session.score_record(&record);
        let post = session.score_against(&result.record, &record);
        logger
            .log_run(
                session.registry(),
                &AuditRun {
                    policy: &policy,
                    original: &record,
                    log: &result.log,
                    compliance: &result.compliance,
                    pre: &pre,
                    post: &post,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_log_run_never_contains_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("phi-guard.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let run_id = run_and_log(&logger);
        assert!(!run_id.is_nil());

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains(&run_id.to_string()));
        assert!(content.contains(&fingerprint("John^Doe")));
        assert!(!content.contains("John^Doe"));
        assert!(!content.contains("12345\""));

        let entry: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(entry["policy"], "scenario");
        assert_eq!(entry["compliance"]["processed"], 2);
        assert_eq!(entry["post_risk"]["risk_level"], "LOW");
    }

    #[test]
    fn test_text_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();
        run_and_log(&logger);

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Policy: scenario"));
        assert!(content.contains("Risk: 100.0% -> 10.0%"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let logger = AuditLogger::disabled();
        assert!(run_and_log(&logger).is_nil());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("a"), fingerprint("a"));
        assert_ne!(fingerprint("a"), fingerprint("b"));
        assert_eq!(fingerprint("a").len(), 64);
    }
}
