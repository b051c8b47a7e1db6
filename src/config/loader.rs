//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PhiGuardConfig;
use crate::domain::errors::PhiGuardError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PhiGuardConfig
/// 4. Applies environment variable overrides (PHIGUARD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PhiGuardError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, an
/// override has a bad value or validation fails.
///
/// # Examples
///
/// ```no_run
/// use phi_guard::config::loader::load_config;
///
/// let config = load_config("phi-guard.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PhiGuardConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PhiGuardError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PhiGuardError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Substitute, parse, override and validate configuration text
pub fn parse_config(contents: &str) -> Result<PhiGuardConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PhiGuardConfig = toml::from_str(&contents)
        .map_err(|e| PhiGuardError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PhiGuardError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported at
/// once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PhiGuardError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PhiGuardError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using PHIGUARD_* prefix
///
/// Variables follow the pattern PHIGUARD_<SECTION>_<KEY>, for example
/// PHIGUARD_SCORING_FAIL_ON_RISK or PHIGUARD_ANONYMIZATION_SALT.
fn apply_env_overrides(config: &mut PhiGuardConfig) -> Result<()> {
    if let Ok(val) = std::env::var("PHIGUARD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("PHIGUARD_SCORING_FAIL_ON_RISK") {
        let threshold = val.parse().map_err(|_| {
            PhiGuardError::Configuration(format!(
                "Invalid PHIGUARD_SCORING_FAIL_ON_RISK value: {val}"
            ))
        })?;
        config.scoring.fail_on_risk = Some(threshold);
    }
    if let Ok(val) = std::env::var("PHIGUARD_SCORING_REGISTRY_PATH") {
        config.scoring.registry_path = Some(PathBuf::from(val));
    }

    config.anonymization.apply_env_overrides()?;
    config.audit.apply_env_overrides()?;

    if let Ok(val) = std::env::var("PHIGUARD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().map_err(|_| {
            PhiGuardError::Configuration(format!(
                "Invalid PHIGUARD_LOGGING_LOCAL_ENABLED value: {val}"
            ))
        })?;
    }
    if let Ok(val) = std::env::var("PHIGUARD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PHIGUARD_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Serializes tests that read or write process environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_substitute_env_vars() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var("PHIGUARD_TEST_SALT", "pepper");
        let input = "salt = \"${PHIGUARD_TEST_SALT}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "salt = \"pepper\"\n");
        std::env::remove_var("PHIGUARD_TEST_SALT");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("PHIGUARD_TEST_MISSING");
        let input = "salt = \"${PHIGUARD_TEST_MISSING}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PHIGUARD_TEST_MISSING"));
    }

    #[test]
    fn test_comment_lines_not_substituted() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("PHIGUARD_TEST_COMMENTED");
        let input = "# salt = \"${PHIGUARD_TEST_COMMENTED}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-phi-guard.toml");
        assert!(matches!(result, Err(PhiGuardError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[application]
log_level = "debug"

[scoring]
fail_on_risk = 40.0

[scoring.weights]
name = 2.0

[anonymization]
profiles = ["basic", "clean_descriptors"]
digest = "sha512"

[[anonymization.rules]]
field = "PatientID"
action = "REPLACE"
value = "ANON-0001"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.scoring.fail_on_risk, Some(40.0));
        assert_eq!(config.scoring.weights.get("name"), Some(&2.0));
        assert_eq!(config.anonymization.profiles.len(), 2);
        assert_eq!(config.anonymization.rules.len(), 1);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let err = parse_config("[anonymization]\ndigest = \"md5\"\n").unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_env_override_threshold() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var("PHIGUARD_SCORING_FAIL_ON_RISK", "25");
        let config = parse_config("").unwrap();
        std::env::remove_var("PHIGUARD_SCORING_FAIL_ON_RISK");
        assert_eq!(config.scoring.fail_on_risk, Some(25.0));
    }
}
