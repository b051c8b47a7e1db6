//! Dataset diff
//!
//! Classifies every field's transition (added, removed, changed, unchanged,
//! still absent) between two versions of a record, comparing on canonical
//! identifiers and normalized values.

pub mod dataset_diff;
pub mod normalize;

pub use dataset_diff::{Delta, DeltaCounts, DiffEngine, FieldDelta, NotAnalyzed, Transition};
pub use normalize::values_equal;
