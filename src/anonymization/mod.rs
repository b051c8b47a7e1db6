//! Rule-driven anonymization
//!
//! # Architecture
//!
//! - **Actions** ([`Action`], [`Rule`]): REMOVE, HASH, REPLACE(value), EMPTY
//! - **Policies** ([`Policy`]): ordered rules from the built-in profiles
//!   (`basic`, `clean_descriptors`) and/or `[[anonymization.rules]]`
//! - **Hashing** ([`KeyedHasher`]): HMAC keyed by the salt
//! - **Engine** ([`ActionEngine`]): applies a policy, returns the transformed
//!   record, a [`ComplianceReport`] and the action log
//! - **Audit** ([`audit::AuditLogger`]): JSON-lines trail with fingerprinted
//!   values
//!
//! # Usage
//!
//! ```rust
//! use phi_guard::anonymization::{merge_profiles, ActionEngine};
//! use phi_guard::domain::Record;
//! use phi_guard::risk::TagRegistry;
//! use std::sync::Arc;
//!
//! let engine = ActionEngine::new(Arc::new(TagRegistry::builtin().unwrap()), None);
//! let policy = merge_profiles(&["clean_descriptors"]).unwrap();
//!
//! let mut record = Record::new();
//! record.insert("StudyDescription", "CT HEAD");
//! let result = engine.apply(&record, &policy).unwrap();
//! assert!(result.record.is_empty());
//! ```

pub mod action;
pub mod audit;
pub mod compliance;
pub mod config;
pub mod engine;
pub mod hashing;
pub mod policy;

pub use action::{Action, Rule, RuleSpec};
pub use compliance::{render_compliance, ComplianceReport};
pub use config::{AnonymizationConfig, AuditConfig};
pub use engine::{ActionEngine, ActionLogEntry, ActionOutcome, Anonymized};
pub use hashing::{is_hash_output, DigestAlgorithm, KeyedHasher};
pub use policy::{merge_profiles, profile, Policy, PROFILE_NAMES};
