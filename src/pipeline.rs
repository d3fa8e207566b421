//! End-to-end report generation.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::agile::describe_sprint;
use crate::config::default_title;
use crate::config_loader::load_report_configuration;
use crate::credentials::Credentials;
use crate::error::JiraReportError;
use crate::jira_client::{search_issues, JiraClient};
use crate::jql::build_jql;
use crate::models::{
    RawReportDocument, ReportConfig, ReportKind, ReportWindow, SprintInfo, SprintSelector,
};
use crate::report_files::{write_report_files, ReportPaths};
use crate::report_render::{render, RenderOptions, SprintSection};
use crate::sprint_summary::{summarize, summary_fields};

/// Inputs of one report run.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub config_path: PathBuf,
    /// Directory output basenames are resolved against.
    pub output_dir: PathBuf,
    pub now: DateTime<Utc>,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub issue_count: usize,
    pub jql: String,
    pub paths: ReportPaths,
    pub sprint: Option<SprintInfo>,
    pub total_story_points: Option<f64>,
}

/// Run a report: load config, query Jira, render and write both files.
///
/// Configuration and credentials are fully validated before the first
/// request. Any failure returns before a file is written.
///
/// # Errors
///
/// Returns the first `JiraReportError` encountered.
pub fn generate_report(
    request: &ReportRequest,
    credentials: &Credentials,
) -> Result<ReportOutcome, JiraReportError> {
    let mut config = load_report_configuration(&request.config_path, request.kind, credentials)?;
    let client = JiraClient::new(
        credentials,
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let sprint = match &config.window {
        ReportWindow::Sprint(selector) => Some(describe_sprint(
            &client,
            selector,
            &config.project_key,
            config.board_id,
        )?),
        ReportWindow::Lookback { .. } => None,
    };
    pin_resolved_sprint(&mut config, sprint.as_ref());
    let jql = build_jql(&config, request.now);
    info!(report = request.kind.name(), %jql, "generating report");

    let fields = request_fields(&config);
    let issues = search_issues(&client, config.api_version, &jql, &fields, config.page_size)?;
    info!(count = issues.len(), "fetched issues");

    let section = sprint.as_ref().map(|sprint| SprintSection {
        project_key: config.project_key.clone(),
        sprint: sprint.clone(),
        summary: summarize(&issues, config.story_points_field.as_deref()),
    });
    let total_story_points = section
        .as_ref()
        .map(|section| section.summary.total_story_points);
    let options = RenderOptions {
        title: report_title(&config, sprint.as_ref()),
        sprint: section,
    };

    let document = RawReportDocument::new(issues, jql);
    let rendered = render(&document, &config.columns, &config.base_url, &options)?;
    let paths = ReportPaths::for_basename(&request.output_dir, &config.output_basename);
    write_report_files(&paths, &rendered)?;
    info!(json = %paths.json.display(), html = %paths.html.display(), "wrote report");

    Ok(ReportOutcome {
        kind: request.kind,
        issue_count: document.count,
        jql: document.jql,
        paths,
        sprint,
        total_story_points,
    })
}

/// Fields requested from the search endpoint, without duplicates.
pub fn request_fields(config: &ReportConfig) -> Vec<String> {
    let mut fields = config.fields.clone();
    if config.kind == ReportKind::SprintStatus {
        fields.extend(summary_fields(config.story_points_field.as_deref()));
    }
    let mut seen = std::collections::HashSet::new();
    fields.retain(|field| seen.insert(field.clone()));
    fields
}

/// Narrow an active-sprint window to the sprint the board lookup found, so
/// the issues match the sprint named in the report header.
pub fn pin_resolved_sprint(config: &mut ReportConfig, sprint: Option<&SprintInfo>) {
    let resolved_id = match (&config.window, sprint) {
        (ReportWindow::Sprint(SprintSelector::Active), Some(info)) => info.id,
        _ => None,
    };
    if let Some(id) = resolved_id {
        config.window = ReportWindow::Sprint(SprintSelector::Id(id));
    }
}

fn report_title(config: &ReportConfig, sprint: Option<&SprintInfo>) -> String {
    if let Some(title) = &config.title {
        return title.clone();
    }
    match (&config.window, sprint) {
        (ReportWindow::Sprint(_), Some(sprint)) => format!("Sprint Status: {}", sprint.name),
        (ReportWindow::Lookback { days, .. }, _) => {
            default_title(config.kind, &config.project_key, &config.issue_types, *days)
        }
        (ReportWindow::Sprint(_), None) => {
            default_title(config.kind, &config.project_key, &config.issue_types, 0)
        }
    }
}
