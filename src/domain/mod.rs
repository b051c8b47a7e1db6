//! Domain models and types for PHI Guard.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Records** ([`Record`], [`FieldValue`]) with three-way presence ([`FieldState`])
//! - **Tag numbers** ([`tag::TagNumber`]) for keyword/tag-number resolution
//! - **Error types** ([`PhiGuardError`], [`PolicyError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PhiGuardError>`]:
//!
//! ```rust
//! use phi_guard::domain::{PhiGuardError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(PhiGuardError::Validation("bad input".to_string()))
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;
pub mod tag;

pub use errors::{PhiGuardError, PolicyError};
pub use record::{is_placeholder, FieldState, FieldValue, FieldView, Record, PLACEHOLDERS};
pub use result::Result;
pub use tag::TagNumber;
