//! Dojo - skill progression for the Data Analysis Dojo
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dojo::config::{crash_log_path, progress_log_path, Config};
use dojo::error::{exit_codes, DojoError};
use dojo::grading::ThresholdGrader;
use dojo::storage::FileRecordStore;
use dojo::tracker::{CompletionHandler, ProgressLog};

// =============================================================================
// CLI Definition
// =============================================================================

/// Dojo - track skill proficiency across the Data Analysis Dojo curriculum
#[derive(Parser)]
#[command(name = "dojo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the catalog from the built-in curriculum
    Init {
        /// Reinstall the catalog even if one exists
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List modules and activities
    Catalog {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Grade and record an activity completion
    Complete {
        /// User identifier
        user: String,
        /// Activity id, e.g. mod-01-learn
        activity: String,
        /// Self-reported score (0-100)
        #[arg(long)]
        score: Option<u8>,
        /// Selected answer per question, comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
        /// Record this outcome instead of grading
        #[arg(long)]
        passed: Option<bool>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show profile and proficiency summary
    Dashboard {
        /// User identifier
        user: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the proficiency summary only
    Skills {
        /// User identifier
        user: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show recent progress events
    History {
        /// User identifier
        user: String,
        /// Maximum number of events
        #[arg(long, short, default_value_t = dojo::cli::history::DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dojo error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOJO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to `<dojo_home>/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("dojo panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Init { force, json, quiet } => run_init(&config, force, json, quiet),
        Commands::Catalog { json, quiet } => run_catalog(&config, json, quiet),
        Commands::Complete {
            user,
            activity,
            score,
            answers,
            passed,
            json,
            quiet,
        } => run_complete(
            &config,
            &user,
            &activity,
            dojo::cli::complete::CompleteOptions {
                json,
                quiet,
                score,
                answers,
                passed,
            },
        ),
        Commands::Dashboard { user, json, quiet } => run_dashboard(&config, &user, json, quiet),
        Commands::Skills { user, json, quiet } => run_skills(&config, &user, json, quiet),
        Commands::History {
            user,
            limit,
            json,
            quiet,
        } => run_history(&user, limit, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn open_store(config: &Config) -> Result<Arc<FileRecordStore>, DojoError> {
    let path = config.data_file().ok_or_else(|| {
        DojoError::config("Could not determine data file location (no home directory)")
    })?;
    tracing::debug!(path = %path.display(), "opening record store");
    Ok(Arc::new(FileRecordStore::with_path(path)))
}

fn open_log() -> Result<ProgressLog, DojoError> {
    progress_log_path()
        .map(ProgressLog::new)
        .ok_or_else(|| DojoError::config("Could not determine progress log location"))
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print(formatted: String) {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}

fn run_init(
    config: &Config,
    force: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(open_store(config)?);
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_catalog(
    config: &Config,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::catalog::{CatalogCommand, CatalogOptions};

    let cmd = CatalogCommand::new(open_store(config)?);
    let options = CatalogOptions { json, quiet };

    let output = cmd.run(&options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_complete(
    config: &Config,
    user: &str,
    activity: &str,
    options: dojo::cli::complete::CompleteOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::complete::CompleteCommand;

    let grader = ThresholdGrader::new(config.grading.pass_threshold)?;
    let handler = CompletionHandler::new(open_store(config)?, grader)
        .with_xp_per_level(config.xp.per_level);
    let cmd = CompleteCommand::new(handler).with_log(open_log()?);

    let output = cmd.run(user, activity, &options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_dashboard(
    config: &Config,
    user: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::dashboard::{DashboardCommand, DashboardOptions};

    let cmd = DashboardCommand::new(open_store(config)?, config.xp.per_level);
    let options = DashboardOptions { json, quiet };

    let output = cmd.run(user, &options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_skills(
    config: &Config,
    user: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::skills::{SkillsCommand, SkillsOptions};

    let cmd = SkillsCommand::new(open_store(config)?);
    let options = SkillsOptions { json, quiet };

    let output = cmd.run(user, &options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_history(
    user: &str,
    limit: usize,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use dojo::cli::history::{HistoryCommand, HistoryOptions};

    let cmd = HistoryCommand::new(open_log()?);
    let options = HistoryOptions { json, quiet, limit };

    let output = cmd.run(user, &options);
    print(cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
