//! Domain error types
//!
//! This module defines the error hierarchy for PHI Guard.
//! All errors are domain-specific and don't expose third-party types.
//!
//! Only structurally invalid inputs are errors: a malformed policy, a bad
//! weight, an unsupported digest. Data-shape conditions (missing fields,
//! sequences, unknown identifiers) are reported inside the value objects the
//! components return.

use thiserror::Error;

/// Main PHI Guard error type
#[derive(Debug, Error)]
pub enum PhiGuardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A policy failed validation; nothing was applied
    #[error("Invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),

    /// A weight override was rejected; the weight table is unchanged
    #[error("Invalid weight for category '{category}': {multiplier} (must be finite and >= 0)")]
    InvalidWeight { category: String, multiplier: f64 },

    /// Category name not in {name, id, date, time, uid, descriptor, unknown}
    #[error("Unknown risk category: {0}")]
    UnknownCategory(String),

    /// Requested digest algorithm is not supported by the keyed hash
    #[error("Unsupported digest algorithm: {0} (supported: sha256, sha512)")]
    UnsupportedDigest(String),

    /// Record could not be read or represented
    #[error("Record error: {0}")]
    Record(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Policy validation errors
///
/// Every variant carries the rule index (0-based, in policy order) and the
/// field it names so the caller can fix the input and retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// Action kind outside REMOVE, HASH, REPLACE, EMPTY
    #[error("rule #{index} ({field}): unknown action '{action}'")]
    UnknownAction {
        index: usize,
        field: String,
        action: String,
    },

    /// REPLACE without a replacement value
    #[error("rule #{index} ({field}): REPLACE requires a value")]
    MissingReplacement { index: usize, field: String },

    /// Rule with an empty field identifier
    #[error("rule #{index}: field identifier is empty")]
    EmptyFieldId { index: usize },

    /// Named profile does not exist
    #[error("unknown profile '{0}' (available: basic, clean_descriptors)")]
    UnknownProfile(String),
}

impl From<std::io::Error> for PhiGuardError {
    fn from(err: std::io::Error) -> Self {
        PhiGuardError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PhiGuardError {
    fn from(err: serde_json::Error) -> Self {
        PhiGuardError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PhiGuardError {
    fn from(err: toml::de::Error) -> Self {
        PhiGuardError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhiGuardError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_policy_error_conversion() {
        let policy_err = PolicyError::MissingReplacement {
            index: 2,
            field: "PatientName".to_string(),
        };
        let err: PhiGuardError = policy_err.into();
        assert!(matches!(err, PhiGuardError::InvalidPolicy(_)));
        assert!(err.to_string().contains("rule #2 (PatientName)"));
    }

    #[test]
    fn test_invalid_weight_names_category_and_multiplier() {
        let err = PhiGuardError::InvalidWeight {
            category: "name".to_string(),
            multiplier: -1.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("'name'"));
        assert!(msg.contains("-1.5"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PhiGuardError = io_err.into();
        assert!(matches!(err, PhiGuardError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PhiGuardError = json_err.into();
        assert!(matches!(err, PhiGuardError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PhiGuardError = toml_err.into();
        assert!(matches!(err, PhiGuardError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = PhiGuardError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
