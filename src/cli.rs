//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::OutputFormat;
use crate::models::{CheckKind, Tone};
use clap::Parser;
use std::path::PathBuf;

/// TamilScribe - LLM-powered writing assistant for Tamil text
///
/// Spell-check, translate, enrich vocabulary and find idioms for Tamil
/// text using a local AI model. Markdown/JSON reports.
///
/// Examples:
///   tamilscribe "நான் பள்ளிக்கு செல்கிறேன்"
///   tamilscribe --file essay.txt --checks spelling,vocabulary --tone informal
///   echo "Good morning" | tamilscribe --checks translation --format json
///   tamilscribe --file essay.txt --apply --in-place
///   tamilscribe --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Text to analyze
    ///
    /// When neither TEXT nor --file is given, the text is read from stdin.
    #[arg(value_name = "TEXT", conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text to analyze from a file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Checks to run (comma-separated)
    ///
    /// Overrides the [checks] table of the config file. Default: spelling.
    #[arg(long, value_name = "CHECKS", value_delimiter = ',')]
    pub checks: Option<Vec<CheckKind>>,

    /// Tone for the vocabulary check
    #[arg(long, value_name = "TONE")]
    pub tone: Option<Tone>,

    /// Ollama model to use for analysis
    ///
    /// Can also be set via TAMILSCRIBE_MODEL env var or .tamilscribe.toml config.
    #[arg(short, long, env = "TAMILSCRIBE_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds, per model call
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Apply suggested corrections to the text
    ///
    /// Uses the first suggestion for each misspelled word and every
    /// vocabulary replacement. The corrected text is added to the report.
    #[arg(long)]
    pub apply: bool,

    /// Rewrite --file with the corrected text (requires --apply)
    #[arg(long, requires = "apply", requires = "file")]
    pub in_place: bool,

    /// Exit with code 2 when any check fails
    #[arg(long)]
    pub strict: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tamilscribe.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .tamilscribe.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate Ollama URL format
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate temperature range
        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        // A positional TEXT satisfies clap's `requires = "file"` through the conflict
        if self.in_place && self.file.is_none() {
            return Err("--in-place requires --file".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate input file if provided
        if let Some(ref file) = self.file {
            if !file.is_file() {
                return Err(format!("Input file does not exist: {}", file.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; --quiet wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
