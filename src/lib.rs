// PHI Guard - PHI Exposure Scoring and Anonymization Tool
// Copyright (c) 2025 PHI Guard Contributors
// Licensed under the MIT License

//! # PHI Guard - PHI Exposure Scoring and Anonymization
//!
//! PHI Guard measures how much protected health information a medical-imaging
//! metadata record exposes, removes or masks it under a declarative policy,
//! and proves what changed.
//!
//! ## Overview
//!
//! - **Scoring**: weighted per-field risk with a normalized percentage and
//!   level (LOW, MEDIUM, HIGH, CRITICAL)
//! - **Anonymization**: REMOVE, HASH, REPLACE and EMPTY rules, built-in
//!   profiles, keyed hashing, compliance accounting
//! - **Diff**: field-level transitions between two records
//! - **Audit**: pre/post scoring plus a cross-check of the action log
//!   against the diff
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - End-to-end audit pipeline and verification
//! - [`risk`] - Tag registry, weight table, scorer
//! - [`anonymization`] - Actions, policies, action engine, audit trail
//! - [`diff`] - Dataset diff
//! - [`adapters`] - Record providers
//! - [`domain`] - Records, field values, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use phi_guard::anonymization::{Policy, Rule};
//! use phi_guard::config::secret_salt;
//! use phi_guard::anonymization::{DigestAlgorithm, KeyedHasher};
//! use phi_guard::core::PrivacyAudit;
//! use phi_guard::domain::Record;
//! use phi_guard::risk::{RiskLevel, ScoringSession};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new();
//! record.insert("PatientName", "John^Doe");
//! record.insert("PatientID", "12345");
//!
//! let session = Arc::new(ScoringSession::with_defaults()?);
//! let hasher = KeyedHasher::new(secret_salt("site-salt".to_string()), DigestAlgorithm::Sha256);
//! let audit = PrivacyAudit::new(session, Some(hasher));
//!
//! let policy = Policy::new(
//!     "example",
//!     vec![Rule::remove("PatientName"), Rule::hash("PatientID")],
//! )?;
//! let report = audit.run(&record, &policy)?;
//!
//! assert_eq!(report.pre.risk_level, RiskLevel::Critical);
//! assert_eq!(report.post.risk_level, RiskLevel::Low);
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Structurally invalid input (a malformed policy, a bad weight, an
//! unsupported digest) fails with [`domain::PhiGuardError`]. Data-shape
//! conditions such as unknown fields or sequences are reported in the
//! returned values instead.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod diff;
pub mod domain;
pub mod logging;
pub mod risk;
