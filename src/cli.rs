//! CLI command definitions.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::config::default_config_path;
use crate::credentials::Credentials;
use crate::error::JiraReportError;
use crate::models::ReportKind;
use crate::pipeline::{generate_report, ReportOutcome, ReportRequest};

/// jira-report CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "jira-report", version, about = "Generate Jira HTML and JSON reports")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report issues updated within the configured lookback window.
    #[command(name = "weekly-updated", alias = "weekly")]
    WeeklyUpdated {
        /// Path to the JSON configuration file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Report issues in the active or configured sprint.
    #[command(name = "sprint-status", alias = "sprint")]
    SprintStatus {
        /// Path to the JSON configuration file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

impl Commands {
    fn kind(&self) -> ReportKind {
        match self {
            Commands::WeeklyUpdated { .. } => ReportKind::WeeklyUpdated,
            Commands::SprintStatus { .. } => ReportKind::SprintStatus,
        }
    }

    fn config_override(&self) -> Option<&Path> {
        match self {
            Commands::WeeklyUpdated { config } | Commands::SprintStatus { config } => {
                config.as_deref()
            }
        }
    }
}

fn is_help_request(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion
    )
}

/// Output produced by a CLI command.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI using the process arguments, directory and environment.
///
/// # Errors
///
/// Returns `JiraReportError` if execution fails.
pub fn run_from_env() -> Result<(), JiraReportError> {
    run_process(std::env::args_os().collect())
}

/// Run one report using the process environment, as the per-report binaries do.
///
/// # Errors
///
/// Returns `JiraReportError` if execution fails.
pub fn run_report_from_env(kind: ReportKind) -> Result<(), JiraReportError> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    let program = if args.is_empty() {
        OsString::from("jira-report")
    } else {
        args.remove(0)
    };
    let subcommand = match kind {
        ReportKind::WeeklyUpdated => "weekly-updated",
        ReportKind::SprintStatus => "sprint-status",
    };
    let mut full_args = vec![program, OsString::from(subcommand)];
    full_args.extend(args);
    run_process(full_args)
}

fn run_process(args: Vec<OsString>) -> Result<(), JiraReportError> {
    let cwd = std::env::current_dir().map_err(|error| JiraReportError::Io(error.to_string()))?;
    let environment: BTreeMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    run_from_args(args, &cwd, &environment)
}

/// Run the CLI with explicit arguments.
///
/// # Arguments
///
/// * `args` - Command line arguments.
/// * `cwd` - Working directory config and output paths are resolved against.
/// * `environment` - Environment variables holding the Jira credentials.
///
/// # Errors
///
/// Returns `JiraReportError` if execution fails.
pub fn run_from_args<I, T>(
    args: I,
    cwd: &Path,
    environment: &BTreeMap<String, String>,
) -> Result<(), JiraReportError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let output = run_from_args_with_output(args, cwd, environment)?;
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    Ok(())
}

/// Run the CLI with explicit arguments and capture stdout output.
///
/// Credentials come from `environment` only; nothing else reads process
/// state.
///
/// # Errors
///
/// Returns `JiraReportError` if execution fails.
pub fn run_from_args_with_output<I, T>(
    args: I,
    cwd: &Path,
    environment: &BTreeMap<String, String>,
) -> Result<CommandOutput, JiraReportError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args_vec: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cli = match Cli::try_parse_from(&args_vec) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error.render().to_string();
            if is_help_request(error.kind()) {
                return Ok(CommandOutput { stdout: rendered });
            }
            return Err(JiraReportError::Config(rendered));
        }
    };

    let kind = cli.command.kind();
    let config_path = cwd.join(
        cli.command
            .config_override()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_config_path(kind)),
    );
    let credentials = Credentials::from_environment(environment)?;
    let request = ReportRequest {
        kind,
        config_path,
        output_dir: cwd.to_path_buf(),
        now: Utc::now(),
    };
    let outcome = generate_report(&request, &credentials)?;

    Ok(CommandOutput {
        stdout: format_summary(&outcome, should_use_color()),
    })
}

fn format_summary(outcome: &ReportOutcome, use_color: bool) -> String {
    let heading = format!("Done. Fetched {} issues.", outcome.issue_count);
    let mut lines = vec![if use_color {
        heading.green().to_string()
    } else {
        heading
    }];
    lines.push(format!("   Saved JSON -> {}", outcome.paths.json.display()));
    lines.push(format!("   Saved HTML -> {}", outcome.paths.html.display()));
    if let Some(sprint) = &outcome.sprint {
        let id = sprint.id.map(|id| format!(" (#{id})")).unwrap_or_default();
        lines.push(format!("   Sprint     -> {}{id}", sprint.name));
        if let Some(board) = &sprint.board {
            lines.push(format!("   Board      -> {} (#{})", board.name, board.id));
        }
    }
    if let Some(points) = outcome.total_story_points {
        lines.push(format!("   Story Pts  -> {points:.2}"));
    }
    lines.push(format!("   JQL used   -> {}", outcome.jql));
    lines.join("\n")
}

fn should_use_color() -> bool {
    use std::io::IsTerminal;
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}
