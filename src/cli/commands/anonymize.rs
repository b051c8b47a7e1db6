//! Anonymize command implementation

use super::{
    config_failure, load_settings, read_record, EXIT_FATAL, EXIT_GATE_FAILED, EXIT_OK,
};
use crate::adapters::{JsonRecordProvider, RecordSink};
use crate::anonymization::audit::AuditLogger;
use crate::anonymization::compliance::render_compliance;
use crate::config::secret_salt;
use crate::core::PrivacyAudit;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Record to anonymize (JSON)
    pub record: PathBuf,

    /// Output path (default: <record>.anonymized.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Built-in profile; repeat to merge several (overrides the config)
    #[arg(short, long = "profile", value_name = "PROFILE")]
    pub profiles: Vec<String>,

    /// Salt for HASH rules
    #[arg(short, long, env = "PHIGUARD_SALT", hide_env_values = true)]
    pub salt: Option<String>,

    /// Digest for HASH rules (sha256, sha512)
    #[arg(long)]
    pub digest: Option<String>,

    /// Print the compliance report; exit 1 when PHI remains
    #[arg(short, long)]
    pub report: bool,

    /// With --report, do not fail when PHI remains
    #[arg(long)]
    pub ignore_remaining: bool,

    /// Print the action log and risk reduction
    #[arg(short, long)]
    pub verbose: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(record = %self.record.display(), "Anonymizing record");

        let mut config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(config_failure(&e)),
        };

        let anonymization = &mut config.anonymization;
        if !self.profiles.is_empty() {
            anonymization.profiles = self.profiles.clone();
        }
        if let Some(salt) = &self.salt {
            anonymization.salt = Some(secret_salt(salt.clone()));
        }
        if let Some(digest) = &self.digest {
            anonymization.digest = digest.clone();
        }
        if self.ignore_remaining {
            anonymization.ignore_remaining = true;
        }
        if let Err(e) = anonymization.validate() {
            eprintln!("❌ Invalid anonymization settings: {e}");
            return Ok(super::EXIT_CONFIG_ERROR);
        }

        let prepared = anonymization.policy().and_then(|policy| {
            let hasher = anonymization.hasher()?;
            let session = config.scoring.build_session()?;
            Ok((policy, hasher, session))
        });
        let (policy, hasher, session) = match prepared {
            Ok(p) => p,
            Err(e) => return Ok(config_failure(&e)),
        };

        let record = read_record(&self.record)?;
        let audit = PrivacyAudit::new(Arc::new(session), hasher);
        let report = match audit.run(&record, &policy) {
            Ok(r) => r,
            Err(e) => return Ok(config_failure(&e)),
        };

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.record));
        JsonRecordProvider::new()
            .write_record(&report.record, &output)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        if config.audit.enabled {
            let logger = AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                config.audit.enabled,
            )?;
            let run_id = logger.log_run(
                audit.session().registry(),
                &report.audit_run(&policy, &record),
            )?;
            tracing::info!(run_id = %run_id, "Audit entry recorded");
        }

        println!("✅ Anonymized record written to {}", output.display());
        println!(
            "   Policy: {} ({} rules) | Risk: {:.2}% -> {:.2}% ({})",
            policy.name(),
            policy.len(),
            report.pre.risk_percentage,
            report.post.risk_percentage,
            report.post.risk_level
        );

        if self.verbose {
            println!();
            for entry in &report.log {
                println!("  {:<8} {:<28} {}", entry.action, entry.field, entry.outcome);
            }
            println!("  Risk reduction: {:.2} points", report.risk_reduction());
            println!();
            println!("{}", report.delta.render(false));
        }

        if !report.verification.is_success() {
            eprintln!("❌ {}", report.verification.format_summary());
            return Ok(EXIT_FATAL);
        }

        if self.report {
            println!();
            println!("{}", render_compliance(&report.compliance, audit.session().registry()));
            if !report.compliance.is_compliant() && !config.anonymization.ignore_remaining {
                eprintln!(
                    "❌ {} PHI field(s) remain; use --ignore-remaining to accept",
                    report.compliance.remaining
                );
                return Ok(EXIT_GATE_FAILED);
            }
        }

        Ok(EXIT_OK)
    }
}

fn default_output_path(record: &Path) -> PathBuf {
    let stem = record
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "record".to_string());
    record.with_file_name(format!("{stem}.anonymized.json"))
}
