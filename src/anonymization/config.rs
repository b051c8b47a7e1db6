//! Anonymization and audit configuration

use super::action::RuleSpec;
use super::hashing::{DigestAlgorithm, KeyedHasher};
use super::policy::{merge_profiles, Policy};
use crate::config::secret::{secret_salt, SecretSalt};
use crate::domain::errors::PhiGuardError;
use crate::domain::result::Result;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[anonymization]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Built-in profiles, merged in order
    #[serde(default = "default_profiles")]
    pub profiles: Vec<String>,

    /// Salt for the HASH action
    #[serde(default)]
    pub salt: Option<SecretSalt>,

    /// Digest algorithm of the keyed hash
    #[serde(default = "default_digest")]
    pub digest: String,

    /// Do not fail the report gate when PHI remains
    #[serde(default)]
    pub ignore_remaining: bool,

    /// Custom rules; they precede profile rules for the same field
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_profiles() -> Vec<String> {
    vec!["basic".to_string()]
}

fn default_digest() -> String {
    "sha256".to_string()
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            salt: None,
            digest: default_digest(),
            ignore_remaining: false,
            rules: Vec::new(),
        }
    }
}

impl AnonymizationConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.digest
            .parse::<DigestAlgorithm>()
            .map_err(|e| format!("anonymization.digest: {e}"))?;

        if let Some(salt) = &self.salt {
            if salt.expose_secret().is_empty() {
                return Err("anonymization.salt cannot be blank".to_string());
            }
        }

        self.policy().map_err(|e| format!("anonymization: {e}"))?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PHIGUARD_ANONYMIZATION_SALT") {
            self.salt = Some(secret_salt(val));
        }

        if let Ok(val) = std::env::var("PHIGUARD_ANONYMIZATION_DIGEST") {
            self.digest = val;
        }

        if let Ok(val) = std::env::var("PHIGUARD_ANONYMIZATION_PROFILES") {
            self.profiles = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("PHIGUARD_ANONYMIZATION_IGNORE_REMAINING") {
            self.ignore_remaining = val.parse().map_err(|_| {
                PhiGuardError::Configuration(format!(
                    "Invalid PHIGUARD_ANONYMIZATION_IGNORE_REMAINING value: {val}"
                ))
            })?;
        }

        Ok(())
    }

    /// Custom rules followed by the merged profiles
    pub fn policy(&self) -> Result<Policy> {
        let profiles = merge_profiles(self.profiles.as_slice())?;
        if self.rules.is_empty() {
            return Ok(profiles);
        }
        let custom = Policy::from_specs("custom", &self.rules)?;
        Ok(custom.merged_with(&profiles))
    }

    pub fn digest_algorithm(&self) -> Result<DigestAlgorithm> {
        self.digest.parse()
    }

    /// Keyed hasher when a salt is configured
    pub fn hasher(&self) -> Result<Option<KeyedHasher>> {
        let algorithm = self.digest_algorithm()?;
        Ok(self
            .salt
            .clone()
            .map(|salt| KeyedHasher::new(salt, algorithm)))
    }
}

/// `[audit]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/phi-guard.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PHIGUARD_AUDIT_ENABLED") {
            self.enabled = val.parse().map_err(|_| {
                PhiGuardError::Configuration(format!("Invalid PHIGUARD_AUDIT_ENABLED value: {val}"))
            })?;
        }

        if let Ok(val) = std::env::var("PHIGUARD_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PHIGUARD_AUDIT_JSON_FORMAT") {
            self.json_format = val.parse().map_err(|_| {
                PhiGuardError::Configuration(format!(
                    "Invalid PHIGUARD_AUDIT_JSON_FORMAT value: {val}"
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::action::Rule;

    #[test]
    fn test_default_config() {
        let config = AnonymizationConfig::default();
        assert_eq!(config.profiles, vec!["basic".to_string()]);
        assert!(config.salt.is_none());
        assert_eq!(config.digest_algorithm().unwrap(), DigestAlgorithm::Sha256);
        assert!(config.validate().is_ok());
        assert!(config.hasher().unwrap().is_none());
    }

    #[test]
    fn test_unsupported_digest_fails_validation() {
        let config = AnonymizationConfig {
            digest: "md5".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("md5"));
    }

    #[test]
    fn test_custom_rules_precede_profiles() {
        let config = AnonymizationConfig {
            rules: vec![RuleSpec {
                field: "PatientID".to_string(),
                action: "replace".to_string(),
                value: Some("ANONYMIZED".to_string()),
            }],
            ..Default::default()
        };
        let policy = config.policy().unwrap();
        assert_eq!(policy.rules()[0], Rule::replace("PatientID", "ANONYMIZED"));
        assert!(!policy.rules()[1..].iter().any(|r| r.field == "PatientID"));
    }

    #[test]
    fn test_unknown_profile_fails_validation() {
        let config = AnonymizationConfig {
            profiles: vec!["strict".to_string()],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("strict"));
    }

    #[test]
    fn test_audit_defaults() {
        let audit = AuditConfig::default();
        assert!(audit.enabled);
        assert!(audit.json_format);
        assert!(audit.validate().is_ok());
    }
}
