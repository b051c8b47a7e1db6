//! Diff command implementation

use super::{config_failure, load_settings, read_record, EXIT_GATE_FAILED, EXIT_OK};
use crate::diff::DiffEngine;
use crate::risk::TagRegistry;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Record before transformation (JSON)
    pub before: PathBuf,

    /// Record after transformation (JSON)
    pub after: PathBuf,

    /// Also list unchanged fields
    #[arg(short = 'u', long)]
    pub show_unchanged: bool,

    /// Exit 1 when any field was added, removed or changed
    #[arg(long)]
    pub fail_on_changes: bool,

    /// Print the delta as JSON
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    /// Execute the diff command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            before = %self.before.display(),
            after = %self.after.display(),
            "Comparing records"
        );

        let config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(config_failure(&e)),
        };
        let registry = match &config.scoring.registry_path {
            Some(path) => TagRegistry::from_file(path),
            None => TagRegistry::builtin(),
        };
        let registry = match registry {
            Ok(r) => r,
            Err(e) => return Ok(config_failure(&e)),
        };

        let before = read_record(&self.before)?;
        let after = read_record(&self.after)?;
        let delta = DiffEngine::new(Arc::new(registry)).compare(&before, &after);

        if self.json {
            let json = serde_json::to_string_pretty(&delta).context("Failed to serialize delta")?;
            println!("{json}");
        } else {
            println!("{}", delta.render(self.show_unchanged));
        }

        if self.fail_on_changes && delta.has_changes() {
            let counts = delta.counts();
            tracing::warn!(
                removed = counts.removed,
                changed = counts.changed,
                added = counts.added,
                "Records differ"
            );
            return Ok(EXIT_GATE_FAILED);
        }

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn args(before: &NamedTempFile, after: &NamedTempFile) -> DiffArgs {
        DiffArgs {
            before: before.path().to_path_buf(),
            after: after.path().to_path_buf(),
            show_unchanged: false,
            fail_on_changes: true,
            json: false,
        }
    }

    #[test]
    fn test_identical_records_pass() {
        let before = record_file(r#"{"PatientName": "John^Doe"}"#);
        let after = record_file(r#"{"PatientName": "John^Doe"}"#);
        let code = args(&before, &after)
            .execute(super::super::DEFAULT_CONFIG_PATH)
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn test_changes_fail_gate() {
        let before = record_file(r#"{"PatientName": "John^Doe"}"#);
        let after = record_file(r#"{}"#);
        let code = args(&before, &after)
            .execute(super::super::DEFAULT_CONFIG_PATH)
            .unwrap();
        assert_eq!(code, EXIT_GATE_FAILED);
    }
}
