//! Weekly-updated report entry point.

use jira_report::cli::{init_logging, run_report_from_env};
use jira_report::models::ReportKind;

fn main() {
    init_logging();
    if let Err(error) = run_report_from_env(ReportKind::WeeklyUpdated) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
