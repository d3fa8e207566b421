//! jira-report Rust library.

pub mod agile;
pub mod cli;
pub mod config;
pub mod config_loader;
pub mod credentials;
pub mod error;
pub mod jira_client;
pub mod jql;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod report_files;
pub mod report_render;
pub mod sprint_summary;
