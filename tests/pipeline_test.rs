//! Integration tests for the end-to-end privacy audit

use phi_guard::anonymization::audit::AuditLogger;
use phi_guard::anonymization::{
    merge_profiles, ActionOutcome, DigestAlgorithm, KeyedHasher, Policy, Rule,
};
use phi_guard::config::secret_salt;
use phi_guard::core::PrivacyAudit;
use phi_guard::diff::Transition;
use phi_guard::domain::Record;
use phi_guard::risk::{RiskLevel, ScoringSession};
use std::sync::Arc;
use tempfile::tempdir;

fn privacy_audit() -> PrivacyAudit {
    PrivacyAudit::new(
        Arc::new(ScoringSession::with_defaults().unwrap()),
        Some(KeyedHasher::new(
            secret_salt("pipeline-salt".to_string()),
            DigestAlgorithm::Sha256,
        )),
    )
}

fn study_record() -> Record {
    let mut record = Record::new();
    record.insert("PatientName", "John^Doe");
    record.insert("PatientID", "12345");
    record.insert("PatientBirthDate", "19700101");
    record.insert("StudyDate", "20240105");
    record.insert("AccessionNumber", "A-1001");
    record.insert("InstitutionName", "General Hospital");
    record.insert("StudyDescription", "CT HEAD");
    record.insert("Modality", "CT");
    record
}

#[test]
fn test_scenario_report() {
    let mut record = Record::new();
    record.insert("PatientName", "John^Doe");
    record.insert("PatientID", "12345");
    let policy = Policy::new(
        "scenario",
        vec![Rule::remove("PatientName"), Rule::hash("PatientID")],
    )
    .unwrap();

    let report = privacy_audit().run(&record, &policy).unwrap();

    assert_eq!(report.pre.risk_level, RiskLevel::Critical);
    assert_eq!(report.post.total_score, 1.0);
    assert_eq!(report.post.max_score, 10.0);
    assert_eq!(report.post.risk_level, RiskLevel::Low);
    assert_eq!(report.risk_reduction(), 90.0);
    assert_eq!(report.delta.transition("PatientName"), Some(Transition::Removed));
    assert_eq!(report.delta.transition("PatientID"), Some(Transition::Changed));
    assert!(report.verification.is_success());
    assert!(report.passed());

    // The input is never modified
    assert_eq!(record.len(), 2);
}

#[test]
fn test_profile_run_is_compliant_and_verified() {
    let record = study_record();
    let policy = merge_profiles(&["basic", "clean_descriptors"]).unwrap();

    let report = privacy_audit().run(&record, &policy).unwrap();

    assert!(report.compliance.is_compliant(), "{:?}", report.compliance);
    assert!(report.verification.is_success());
    assert_eq!(report.verification.failed, 0);
    assert!(report.post.risk_percentage < report.pre.risk_percentage);
    assert_eq!(report.record.get("Modality"), record.get("Modality"));
    assert!(report
        .log
        .iter()
        .all(|entry| entry.outcome != ActionOutcome::SkippedSequence));
}

#[test]
fn test_remaining_phi_fails_compliance_but_verifies() {
    let record = study_record();
    let policy = Policy::new("partial", vec![Rule::remove("PatientName")]).unwrap();

    let report = privacy_audit().run(&record, &policy).unwrap();

    assert!(!report.compliance.is_compliant());
    assert!(report
        .compliance
        .remaining_fields
        .iter()
        .any(|field| field == "PatientID"));
    assert!(report.verification.is_success());
    assert!(!report.passed());
}

#[test]
fn test_removed_sequence_verifies() {
    let mut record = Record::new();
    record.insert("PatientName", "John^Doe");
    let mut item = Record::new();
    item.insert("ReferencedSOPInstanceUID", "1.2.3");
    record.insert("ReferencedStudySequence", vec![item]);
    let policy = Policy::new(
        "sequences",
        vec![
            Rule::remove("PatientName"),
            Rule::remove("ReferencedStudySequence"),
        ],
    )
    .unwrap();

    let report = privacy_audit().run(&record, &policy).unwrap();

    assert!(!report.record.contains("ReferencedStudySequence"));
    assert_eq!(report.delta.transition("ReferencedStudySequence"), None);
    assert!(report.delta.sequence("ReferencedStudySequence").is_some());
    assert!(report.verification.is_success(), "{:?}", report.verification);
    assert_eq!(report.verification.passed, 2);
    assert!(report.passed());
}

#[test]
fn test_report_serializes_without_record() {
    let record = study_record();
    let policy = merge_profiles(&["basic"]).unwrap();
    let report = privacy_audit().run(&record, &policy).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("record").is_none());
    assert_eq!(json["policy"], report.policy.as_str());
    assert!(json["pre"]["risk_percentage"].is_number());
}

#[test]
fn test_audit_trail_for_report() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("audit").join("phi-guard.log");
    let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

    let audit = privacy_audit();
    let record = study_record();
    let policy = merge_profiles(&["basic"]).unwrap();
    let report = audit.run(&record, &policy).unwrap();

    let first = logger
        .log_run(audit.session().registry(), &report.audit_run(&policy, &record))
        .unwrap();
    let second = logger
        .log_run(audit.session().registry(), &report.audit_run(&policy, &record))
        .unwrap();
    assert_ne!(first, second);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(!content.contains("John^Doe"));
    assert!(!content.contains("General Hospital"));

    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["run_id"], first.to_string());
    assert_eq!(entry["policy"], policy.name());
    assert_eq!(
        entry["rules"].as_array().unwrap().len(),
        report.log.len()
    );
}
