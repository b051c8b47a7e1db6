//! Record provider traits
//!
//! The binary record parser/writer is external; these traits are the seam a
//! provider plugs into.

use crate::domain::record::Record;
use crate::domain::Result;
use std::path::Path;

/// Reads records from some storage format
pub trait RecordSource {
    /// Parse a record from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid record.
    fn read_record(&self, path: &Path) -> Result<Record>;
}

/// Writes records in some storage format
pub trait RecordSink {
    /// Write `record` to `path`, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be represented or written.
    fn write_record(&self, record: &Record, path: &Path) -> Result<()>;
}
