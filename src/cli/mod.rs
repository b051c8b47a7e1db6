//! CLI interface and argument parsing
//!
//! Exit codes: 0 success, 1 gate failed, 2 configuration error, 5 fatal.

pub mod commands;

use clap::{Parser, Subcommand};

/// PHI Guard - PHI exposure scoring, anonymization and verification
#[derive(Parser, Debug)]
#[command(name = "phi-guard")]
#[command(version, about, long_about = None)]
#[command(author = "PHI Guard Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = commands::DEFAULT_CONFIG_PATH, env = "PHIGUARD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHIGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score the PHI exposure of a record
    Score(commands::score::ScoreArgs),

    /// Apply an anonymization policy to a record
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Compare two records field by field
    Diff(commands::diff::DiffArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Run the selected command and return its exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Score(args) => args.execute(&self.config),
            Commands::Anonymize(args) => args.execute(&self.config),
            Commands::Diff(args) => args.execute(&self.config),
            Commands::ValidateConfig(args) => args.execute(&self.config),
            Commands::Init(args) => args.execute(),
        }
    }
}
