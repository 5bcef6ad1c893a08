//! TamilScribe - AI-powered Tamil writing assistant
//!
//! A CLI tool that runs spelling, translation, vocabulary and idiom
//! checks over Tamil text concurrently against an Ollama model and
//! prints a combined report.
//!
//! Exit codes:
//!   0 - Success (or some checks failed without --strict)
//!   1 - Runtime or validation error (empty text, no checks, config, I/O)
//!   2 - At least one check failed and --strict is set

mod analysis;
mod cli;
mod config;
mod correction;
mod models;
mod provider;
mod report;

use analysis::{Dispatcher, ScanError};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, OutputFormat, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::ScanRequest;
use provider::{OllamaConfig, OllamaProvider};
use report::{ReportMetadata, ScanDocument};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first: [general] verbose decides the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("TamilScribe v{}", env!("CARGO_PKG_VERSION"));
    origin.log();
    debug!("Arguments: {:?}", args);

    match run_scan(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tamilscribe.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to choose the model, default checks and tone.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report printed to stdout stays clean.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one scan end to end. Returns the exit code.
async fn run_scan(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let text = read_input(&args)?;
    let request = ScanRequest::new(text, config.checks.selection());
    let enabled = request.selection().enabled();

    let provider = OllamaProvider::new(OllamaConfig {
        ollama_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })
    .context("Failed to create Ollama client")?;
    let dispatcher = Dispatcher::new(provider);

    let spinner = (!args.quiet && !enabled.is_empty()).then(|| start_spinner(enabled.len()));

    let result = dispatcher.dispatch(&request).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(ScanError::Validation(e)) => {
            eprintln!("⚠️  {}: {}", e.title(), e);
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    if !args.quiet {
        for notification in report.notifications() {
            eprintln!("❌ {}", notification);
        }
    }

    let metadata = ReportMetadata {
        analysis_date: Utc::now(),
        model_used: config.model.name.clone(),
        generation: report.generation(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
        input_chars: request.text().chars().count(),
    };
    let mut document = ScanDocument::new(metadata, &report);

    if args.apply {
        let changes = correction::collect_changes(&report);
        info!("Applying {} correction(s)", changes.len());
        let corrected = correction::apply_all(request.text(), &changes);

        if args.in_place {
            let file = args
                .file
                .as_deref()
                .context("--in-place requires --file")?;
            write_atomically(file, &corrected)?;
            eprintln!("✏️  Rewrote {}", file.display());
        }

        document = document.with_corrected_text(corrected);
    }

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&document)?,
        OutputFormat::Markdown => report::generate_markdown_report(&document),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            if !args.quiet {
                eprintln!("\n📊 Scan Summary:\n{}", analysis::generate_summary_text(&report));
                eprintln!("\n✅ Report saved to: {}", path);
            }
        }
        None => print!("{}", output),
    }

    if args.strict && report.has_failures() {
        eprintln!("⛔ One or more checks failed. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

fn start_spinner(checks: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Running {} check(s)...", checks));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Read the text to scan from the positional argument, --file, or stdin.
fn read_input(args: &Args) -> Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    if let Some(ref file) = args.file {
        return std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read input file: {}", file.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}

/// Replace `path` with `content` through a temporary file in the same directory.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let permissions = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?
        .permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())?;
    // The temporary file is created 0600; keep the original mode
    tmp.as_file()
        .set_permissions(permissions)
        .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

/// Where the configuration came from, logged once logging is up.
#[derive(Debug)]
enum ConfigOrigin {
    Explicit(PathBuf),
    WorkingDir,
    Defaults,
    Unreadable(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::WorkingDir => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so it reports where the
/// configuration came from instead of logging.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_from_dir(Path::new(".")) {
        Ok(Some(config)) => Ok((config, ConfigOrigin::WorkingDir)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Unreadable(format!("{:#}", e)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_write_atomically_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        std::fs::write(&path, "நான் சாப்பாடு").unwrap();

        write_atomically(&path, "நான் உணவு").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "நான் உணவு");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomically_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        std::fs::write(&path, "நான் சாப்பாடு").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_atomically(&path, "நான் உணவு").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_write_atomically_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_atomically(&dir.path().join("missing.txt"), "x").is_err());
    }

    #[test]
    fn test_read_input_prefers_argument() {
        let args = Args::parse_from(["tamilscribe", "வணக்கம்"]);
        assert_eq!(read_input(&args).unwrap(), "வணக்கம்");
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "தமிழ்\n").unwrap();

        let args = Args::parse_from(["tamilscribe", "--file", path.to_str().unwrap()]);
        assert_eq!(read_input(&args).unwrap(), "தமிழ்\n");
    }

    #[test]
    fn test_explicit_config_sets_verbose_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();

        let args = Args::parse_from(["tamilscribe", "--config", path.to_str().unwrap(), "x"]);
        let (config, origin) = load_config(&args).unwrap();

        assert!(matches!(origin, ConfigOrigin::Explicit(_)));
        assert_eq!(
            args.log_level(config.general.verbose),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let args = Args::parse_from(["tamilscribe", "--config", "/no/such/config.toml", "x"]);
        assert!(load_config(&args).is_err());
    }
}
