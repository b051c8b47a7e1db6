//! Init command implementation
//!
//! Writes a starter configuration with a freshly generated salt.

use super::{DEFAULT_CONFIG_PATH, EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_OK};
use crate::config::generate_salt;
use clap::Args;
use secrecy::ExposeSecret;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let salt = generate_salt();
        let content = starter_config(salt.expose_secret().as_str());

        match fs::write(&self.output, content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Keep the generated salt secret; the same salt yields the same hashes");
                println!("  2. Adjust profiles, rules and weights in {}", self.output);
                println!("  3. Validate configuration: phi-guard validate-config");
                println!("  4. Score a record: phi-guard score record.json");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

fn starter_config(salt: &str) -> String {
    format!(
        r#"# PHI Guard Configuration File

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[scoring]
# score exits 1 when the risk percentage is at or above this value
fail_on_risk = 50.0

# Replacement tag registry; the built-in registry when unset
# registry_path = "tags/tag_registry.toml"

# Category multipliers (name, id, date, time, uid, descriptor, unknown)
[scoring.weights]
name = 1.0
id = 1.0
date = 0.8
time = 0.6
uid = 0.7
descriptor = 0.5

[anonymization]
# Built-in profiles merged in order: basic, clean_descriptors
profiles = ["basic"]

# Keyed-hash salt; may also come from PHIGUARD_ANONYMIZATION_SALT
salt = "{salt}"

# Digest for HASH rules (sha256, sha512)
digest = "sha256"

# Do not fail the compliance gate when PHI remains
ignore_remaining = false

# Custom rules take precedence over profile rules for the same field
# [[anonymization.rules]]
# field = "InstitutionName"
# action = "REPLACE"
# value = "ANONYMIZED"

[audit]
enabled = true
log_path = "./audit/phi-guard.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
    )
}
