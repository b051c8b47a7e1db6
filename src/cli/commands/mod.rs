//! CLI command implementations

pub mod anonymize;
pub mod diff;
pub mod init;
pub mod score;
pub mod validate;

use crate::adapters::{JsonRecordProvider, RecordSource};
use crate::config::{load_config, parse_config, PhiGuardConfig};
use crate::domain::errors::PhiGuardError;
use crate::domain::Record;
use anyhow::Context;
use std::path::Path;

/// Success
pub const EXIT_OK: i32 = 0;
/// A gate failed: risk threshold, remaining PHI, changes found
pub const EXIT_GATE_FAILED: i32 = 1;
/// Configuration or policy error
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Anything else
pub const EXIT_FATAL: i32 = 5;

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "phi-guard.toml";

/// Load `config_path`, or built-in defaults when the default file is absent
///
/// An explicitly named file that does not exist is an error.
pub fn load_settings(config_path: &str) -> crate::domain::Result<PhiGuardConfig> {
    if config_path == DEFAULT_CONFIG_PATH && !Path::new(config_path).exists() {
        tracing::debug!("No configuration file found; using defaults");
        return parse_config("");
    }
    load_config(config_path)
}

/// Exit code for an error raised before any record was processed
pub fn exit_code_for(err: &PhiGuardError) -> i32 {
    match err {
        PhiGuardError::Configuration(_)
        | PhiGuardError::InvalidPolicy(_)
        | PhiGuardError::InvalidWeight { .. }
        | PhiGuardError::UnknownCategory(_)
        | PhiGuardError::UnsupportedDigest(_) => EXIT_CONFIG_ERROR,
        _ => EXIT_FATAL,
    }
}

/// Report a configuration-class error and return its exit code
pub fn config_failure(err: &PhiGuardError) -> i32 {
    crate::log_error_with_context!(err, "Configuration error");
    eprintln!("❌ {err}");
    exit_code_for(err)
}

fn read_record(path: &Path) -> anyhow::Result<Record> {
    JsonRecordProvider::new()
        .read_record(path)
        .with_context(|| format!("Failed to load record {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PolicyError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&PhiGuardError::Configuration("x".to_string())),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code_for(&PolicyError::UnknownProfile("strict".to_string()).into()),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(exit_code_for(&PhiGuardError::Io("x".to_string())), EXIT_FATAL);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        assert!(load_settings("does-not-exist.toml").is_err());
    }
}
