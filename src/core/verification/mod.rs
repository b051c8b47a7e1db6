//! Consistency verification
//!
//! Checks that what the action engine says it did is what the diff sees.

pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::verify_log_against_delta;
