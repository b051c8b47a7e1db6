//! Core orchestration for PHI Guard.
//!
//! # Modules
//!
//! - [`pipeline`] - End-to-end privacy audit of one record under one policy
//! - [`verification`] - Cross-check of the action log against the diff
//!
//! # Audit Workflow
//!
//! 1. **Apply**: run the policy through the action engine
//! 2. **Score**: pre and post risk under one weight snapshot; the post score
//!    keeps the original's denominator
//! 3. **Diff**: classify every field transition
//! 4. **Verify**: every logged action must agree with the diff
//!
//! # Example
//!
//! ```rust
//! use phi_guard::anonymization::profile;
//! use phi_guard::core::PrivacyAudit;
//! use phi_guard::domain::Record;
//! use phi_guard::risk::ScoringSession;
//! use std::sync::Arc;
//!
//! let audit = PrivacyAudit::new(Arc::new(ScoringSession::with_defaults().unwrap()), None);
//! let mut record = Record::new();
//! record.insert("AccessionNumber", "A-1001");
//! record.insert("StudyDescription", "CT HEAD");
//!
//! let report = audit
//!     .run(&record, &profile("clean_descriptors").unwrap())
//!     .unwrap();
//! assert!(report.passed());
//! assert_eq!(report.post.total_score, 0.0);
//! ```

pub mod pipeline;
pub mod verification;

pub use pipeline::{AuditReport, PrivacyAudit};
pub use verification::{VerificationFailure, VerificationReport};
