//! Score command implementation

use super::{config_failure, load_settings, read_record, EXIT_GATE_FAILED, EXIT_OK};
use crate::log_risk_score;
use crate::risk::report::render_risk_score;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the score command
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Record to score (JSON)
    pub record: PathBuf,

    /// Exit 1 when the risk percentage is at or above this value
    #[arg(long, value_name = "PCT")]
    pub fail_on_risk: Option<f64>,

    /// Category weight override, e.g. `--weight name=2.0` (repeatable)
    #[arg(short, long = "weight", value_name = "CATEGORY=MULTIPLIER", value_parser = parse_weight)]
    pub weights: Vec<(String, f64)>,

    /// Print the score as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScoreArgs {
    /// Execute the score command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(record = %self.record.display(), "Scoring record");

        let config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(config_failure(&e)),
        };

        let session = match config.scoring.build_session() {
            Ok(s) => s,
            Err(e) => return Ok(config_failure(&e)),
        };
        if !self.weights.is_empty() {
            if let Err(e) = session.adjust_weights(self.weights.iter().map(|(k, v)| (k, *v))) {
                return Ok(config_failure(&e));
            }
        }

        let record = read_record(&self.record)?;
        let score = session.score_record(&record);
        log_risk_score!(self.record.display(), &score);

        if self.json {
            let json = serde_json::to_string_pretty(&score).context("Failed to serialize score")?;
            println!("{json}");
        } else {
            println!("{}", render_risk_score(&score, session.registry()));
        }

        let threshold = self.fail_on_risk.or(config.scoring.fail_on_risk);
        if let Some(threshold) = threshold {
            if score.risk_percentage >= threshold {
                tracing::warn!(
                    risk_percentage = score.risk_percentage,
                    threshold,
                    "Risk threshold exceeded"
                );
                eprintln!(
                    "❌ Risk {:.2}% is at or above the threshold of {:.2}%",
                    score.risk_percentage, threshold
                );
                return Ok(EXIT_GATE_FAILED);
            }
        }

        Ok(EXIT_OK)
    }
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (category, multiplier) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=MULTIPLIER, got '{s}'"))?;
    let multiplier = multiplier
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid multiplier '{multiplier}': {e}"))?;
    Ok((category.trim().to_lowercase(), multiplier))
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

    fn args(path: PathBuf, threshold: Option<f64>) -> ScoreArgs {
        ScoreArgs {
            record: path,
            fail_on_risk: threshold,
            weights: Vec::new(),
            json: true,
        }
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("Name=2.0").unwrap(), ("name".to_string(), 2.0));
        assert!(parse_weight("name").is_err());
        assert!(parse_weight("name=abc").is_err());
    }

    #[test]
    fn test_threshold_gate() {
        let file = record_file(r#"{"PatientName": "John^Doe", "PatientID": "12345"}"#);

        let code = args(file.path().to_path_buf(), Some(50.0))
            .execute(super::super::DEFAULT_CONFIG_PATH)
            .unwrap();
        assert_eq!(code, EXIT_GATE_FAILED);
    }

    #[test]
    fn test_clean_record_passes_gate() {
        let file = record_file(r#"{"Modality": "CT"}"#);

        let code = args(file.path().to_path_buf(), Some(50.0))
            .execute(super::super::DEFAULT_CONFIG_PATH)
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }
}
