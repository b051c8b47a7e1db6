//! Configuration management for PHI Guard.
//!
//! TOML configuration with `${VAR}` substitution, `PHIGUARD_*` environment
//! overrides and validation on load. The keyed-hash salt is held as a
//! [`SecretSalt`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use phi_guard::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phi-guard.toml")?;
//! let session = config.scoring.build_session()?;
//! let policy = config.anonymization.policy()?;
//! println!("{} rules, {} tags", policy.len(), session.registry().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ScoringConfig`] - Registry path, category weights, risk gate
//! - [`AnonymizationConfig`] - Profiles, custom rules, salt, digest
//! - [`AuditConfig`] - Audit trail location and format
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [scoring]
//! fail_on_risk = 50.0
//!
//! [scoring.weights]
//! name = 1.0
//! date = 0.8
//!
//! [anonymization]
//! profiles = ["basic"]
//! salt = "${PHIGUARD_SALT}"
//! digest = "sha256"
//!
//! [[anonymization.rules]]
//! field = "InstitutionName"
//! action = "REPLACE"
//! value = "ANONYMIZED"
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/phi-guard.log"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use crate::anonymization::config::{AnonymizationConfig, AuditConfig};
pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, LoggingConfig, PhiGuardConfig, ScoringConfig};
pub use secret::{generate_salt, secret_salt, SaltValue, SecretSalt};
