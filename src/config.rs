//! Default configuration values for reports.

use std::path::PathBuf;

use crate::models::ReportKind;

/// Issue types selected when a config does not list any.
pub const DEFAULT_ISSUE_TYPES: [&str; 3] = ["Bug", "Story", "Task"];

/// Lookback window for weekly reports, in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Issues requested per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Per-request HTTP timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest page size Jira Cloud honours for search.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default config file location, relative to the working directory.
pub fn default_config_path(kind: ReportKind) -> PathBuf {
    PathBuf::from("configs").join(format!("{}.json", kind.name()))
}

/// Default output basename for a report kind.
pub fn default_output_basename(kind: ReportKind) -> String {
    kind.name().to_string()
}

/// Title used when the config does not set one.
pub fn default_title(kind: ReportKind, project_key: &str, issue_types: &[String], days: u32) -> String {
    match kind {
        ReportKind::WeeklyUpdated if issue_types.is_empty() => {
            format!("{project_key} issues updated in the last {days} days")
        }
        ReportKind::WeeklyUpdated => format!(
            "{project_key} {} updated in the last {days} days",
            issue_types.join("/")
        ),
        ReportKind::SprintStatus => format!("{project_key} sprint status"),
    }
}
