use jira_report::cli::{init_logging, run_from_env};

fn main() {
    init_logging();
    if let Err(error) = run_from_env() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
