//! Record providers.
//!
//! The hierarchical-record parser is external to PHI Guard. Providers
//! implement [`RecordSource`] / [`RecordSink`] and hand the core a
//! [`Record`](crate::domain::Record):
//!
//! - [`json`] - JSON documents mapping field identifiers to values
//!
//! ```rust,no_run
//! use phi_guard::adapters::{JsonRecordProvider, RecordSource};
//! use std::path::Path;
//!
//! # fn example() -> phi_guard::domain::Result<()> {
//! let record = JsonRecordProvider::new().read_record(Path::new("study.json"))?;
//! println!("{} fields", record.len());
//! # Ok(())
//! # }
//! ```

pub mod json;
pub mod traits;

pub use json::JsonRecordProvider;
pub use traits::{RecordSink, RecordSource};
