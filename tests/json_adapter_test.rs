//! JSON record files through the privacy audit

use phi_guard::adapters::{JsonRecordProvider, RecordSink, RecordSource};
use phi_guard::anonymization::{merge_profiles, DigestAlgorithm, KeyedHasher};
use phi_guard::config::secret_salt;
use phi_guard::core::PrivacyAudit;
use phi_guard::domain::{FieldValue, PhiGuardError};
use phi_guard::risk::{RiskLevel, ScoringSession};
use std::sync::Arc;
use tempfile::tempdir;

const STUDY_JSON: &str = r#"{
  "PatientName": "Doe^John",
  "(0010,0020)": "12345",
  "PatientBirthDate": "19700101",
  "PatientWeight": 72.5,
  "ImageType": ["ORIGINAL", "PRIMARY"],
  "StudyTime": null,
  "StudyDescription": "CT HEAD",
  "ReferencedStudySequence": [{ "ReferencedSOPInstanceUID": "1.2.3" }]
}"#;

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("study.json");
    std::fs::write(&input, STUDY_JSON).unwrap();

    let provider = JsonRecordProvider::new();
    let record = provider.read_record(&input).unwrap();
    assert_eq!(record.get("PatientWeight"), Some(&FieldValue::Number(72.5)));
    assert_eq!(record.get("StudyTime"), Some(&FieldValue::Null));
    assert!(record.is_sequence("ReferencedStudySequence"));

    let output = dir.path().join("out").join("copy.json");
    provider.write_record(&record, &output).unwrap();
    let reread = JsonRecordProvider::compact().read_record(&output).unwrap();
    assert_eq!(reread, record);
}

#[test]
fn test_anonymize_json_record() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("study.json");
    std::fs::write(&input, STUDY_JSON).unwrap();

    let provider = JsonRecordProvider::new();
    let record = provider.read_record(&input).unwrap();

    let audit = PrivacyAudit::new(
        Arc::new(ScoringSession::with_defaults().unwrap()),
        Some(KeyedHasher::new(
            secret_salt("json-salt".to_string()),
            DigestAlgorithm::Sha256,
        )),
    );
    let policy = merge_profiles(&["basic", "clean_descriptors"]).unwrap();
    let report = audit.run(&record, &policy).unwrap();

    assert!(report.compliance.is_compliant());
    assert!(report.verification.is_success());
    assert_eq!(report.post.risk_level, RiskLevel::Low);

    let output = dir.path().join("study.anonymized.json");
    provider.write_record(&report.record, &output).unwrap();
    let written = std::fs::read_to_string(&output).unwrap();

    assert!(!written.contains("Doe^John"));
    assert!(!written.contains("\"12345\""));
    assert!(!written.contains("19700101"));
    assert!(written.contains("ReferencedStudySequence"));
    assert!(written.contains("72.5"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = JsonRecordProvider::new()
        .read_record(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, PhiGuardError::Io(_)));
}
