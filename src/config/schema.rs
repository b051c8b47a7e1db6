//! Configuration schema types
//!
//! Every section is optional; an empty file yields the defaults.

use crate::anonymization::config::{AnonymizationConfig, AuditConfig};
use crate::domain::result::Result;
use crate::risk::registry::TagRegistry;
use crate::risk::session::ScoringSession;
use crate::risk::weights::{parse_overrides, WeightTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Main PHI Guard configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhiGuardConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Registry, weights and the risk gate
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Profiles, custom rules and hashing
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Audit trail of anonymization runs
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhiGuardConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.application.validate()?;
        self.scoring.validate()?;
        self.anonymization.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// `[scoring]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// `score` exits 1 when the risk percentage reaches this value
    #[serde(default)]
    pub fail_on_risk: Option<f64>,

    /// Replacement tag registry (TOML); the built-in one when unset
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Category multipliers merged over the defaults
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl ScoringConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(threshold) = self.fail_on_risk {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(format!(
                    "scoring.fail_on_risk must be between 0 and 100, got {threshold}"
                ));
            }
        }

        if let Some(path) = &self.registry_path {
            if path.as_os_str().is_empty() {
                return Err("scoring.registry_path cannot be empty".to_string());
            }
        }

        let overrides = parse_overrides(self.weights.iter().map(|(k, v)| (k, *v)))
            .map_err(|e| format!("scoring.weights: {e}"))?;
        WeightTable::default()
            .merged(overrides)
            .map_err(|e| format!("scoring.weights: {e}"))?;
        Ok(())
    }

    /// Load the registry and apply the configured weights
    pub fn build_session(&self) -> Result<ScoringSession> {
        let registry = match &self.registry_path {
            Some(path) => TagRegistry::from_file(path)?,
            None => TagRegistry::builtin()?,
        };
        let session = ScoringSession::new(Arc::new(registry), WeightTable::default());
        if !self.weights.is_empty() {
            session.adjust_weights(self.weights.iter().map(|(k, v)| (k, *v)))?;
        }
        Ok(session)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Console output only
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Default::default()
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::registry::RiskCategory;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: PhiGuardConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert!(config.scoring.fail_on_risk.is_none());
        assert_eq!(config.anonymization.profiles, vec!["basic".to_string()]);
        assert!(config.audit.enabled);
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scoring_threshold_range() {
        let mut scoring = ScoringConfig {
            fail_on_risk: Some(50.0),
            ..Default::default()
        };
        assert!(scoring.validate().is_ok());

        scoring.fail_on_risk = Some(120.0);
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_scoring_weights_validated() {
        let mut scoring = ScoringConfig::default();
        scoring.weights.insert("name".to_string(), -1.0);
        assert!(scoring.validate().is_err());

        scoring.weights.clear();
        scoring.weights.insert("phone".to_string(), 1.0);
        assert!(scoring.validate().unwrap_err().contains("phone"));
    }

    #[test]
    fn test_build_session_applies_weights() {
        let mut scoring = ScoringConfig::default();
        scoring.weights.insert("date".to_string(), 1.5);

        let session = scoring.build_session().unwrap();
        assert_eq!(session.weights().weight(RiskCategory::Date), 1.5);
        assert_eq!(session.weights().weight(RiskCategory::Name), 1.0);
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut logging = LoggingConfig::default();
        assert!(logging.validate().is_ok());

        logging.local_rotation = "weekly".to_string();
        assert!(logging.validate().is_err());
    }
}
