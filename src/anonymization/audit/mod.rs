//! Audit trail
//!
//! One entry per anonymization run, with original values fingerprinted.

pub mod logger;

pub use logger::{AuditLogger, AuditRun};
