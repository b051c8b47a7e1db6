//! Validate config command implementation

use super::{exit_code_for, EXIT_OK};
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let policy = match config.anonymization.policy() {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Anonymization policy is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let session = match config.scoring.build_session() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Scoring configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Tag Registry: {} ({} tags)",
            config
                .scoring
                .registry_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            session.registry().len()
        );
        let weights: Vec<String> = session
            .weights()
            .iter()
            .map(|(category, weight)| format!("{category}={weight}"))
            .collect();
        println!("  Weights: {}", weights.join(", "));
        match config.scoring.fail_on_risk {
            Some(threshold) => println!("  Risk Gate: {threshold:.2}%"),
            None => println!("  Risk Gate: disabled"),
        }
        println!("  Profiles: {}", config.anonymization.profiles.join(", "));
        println!("  Policy: {} ({} rules)", policy.name(), policy.len());
        println!("  Digest: {}", config.anonymization.digest);
        let salt_status = match &config.anonymization.salt {
            Some(salt) if !salt.expose_secret().is_empty() => "configured",
            _ if policy.contains_hash() => "MISSING (policy hashes)",
            _ => "not set",
        };
        println!("  Salt: {salt_status}");
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.log_path.display());
        } else {
            println!("  Audit Log: disabled");
        }
        println!();
        Ok(EXIT_OK)
    }
}
