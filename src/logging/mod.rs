//! Logging and observability
//!
//! Structured `tracing` output to the console, plus optional JSON files with
//! daily or hourly rotation. The anonymization audit trail is separate (see
//! [`crate::anonymization::audit`]).
//!
//! # Example
//!
//! ```no_run
//! use phi_guard::config::LoggingConfig;
//! use phi_guard::logging::init_logging;
//!
//! let config = LoggingConfig::console_only();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the outcome of scoring one record
///
/// # Example
///
/// ```no_run
/// use phi_guard::log_risk_score;
/// use phi_guard::domain::Record;
/// use phi_guard::risk::ScoringSession;
///
/// let session = ScoringSession::with_defaults().unwrap();
/// let score = session.score_record(&Record::new());
/// log_risk_score!("study.json", &score);
/// ```
#[macro_export]
macro_rules! log_risk_score {
    ($source:expr, $score:expr) => {
        tracing::info!(
            source = %$source,
            total = $score.total_score,
            max = $score.max_score,
            risk_percentage = $score.risk_percentage,
            level = %$score.risk_level,
            "Risk scored"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use phi_guard::log_error_with_context;
/// use phi_guard::domain::PhiGuardError;
///
/// let error = PhiGuardError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
