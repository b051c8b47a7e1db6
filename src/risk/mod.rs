//! Risk model
//!
//! - [`TagRegistry`]: field identifier → (base risk 0–5, category)
//! - [`WeightTable`]: category → multiplier, defaults documented on
//!   [`WeightTable::default`]
//! - [`ScoringSession`]: registry + live weight table; the only place the
//!   table is adjusted
//! - [`RiskScore`]: bounded, itemized, rounded result
//!
//! ```rust
//! use phi_guard::domain::Record;
//! use phi_guard::risk::{RiskLevel, ScoringSession};
//!
//! let session = ScoringSession::with_defaults().unwrap();
//! let mut record = Record::new();
//! record.insert("PatientName", "John^Doe");
//! record.insert("PatientID", "12345");
//!
//! let score = session.score_record(&record);
//! assert_eq!(score.risk_percentage, 100.0);
//! assert_eq!(score.risk_level, RiskLevel::Critical);
//! ```

pub mod registry;
pub mod report;
pub mod scorer;
pub mod session;
pub mod weights;

pub use registry::{RiskCategory, TagEntry, TagMeta, TagRegistry};
pub use report::render_risk_score;
pub use scorer::{
    FieldRisk, RiskLevel, RiskScore, ScoringWarning, HASH_PRESENCE_FACTOR, SCORE_PRECISION,
};
pub use session::ScoringSession;
pub use weights::WeightTable;
