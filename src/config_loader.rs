//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use crate::config::{
    default_output_basename, DEFAULT_ISSUE_TYPES, DEFAULT_LOOKBACK_DAYS, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, MAX_PAGE_SIZE,
};
use crate::credentials::Credentials;
use crate::error::JiraReportError;
use crate::models::{
    ApiVersion, LookbackStyle, ReportConfig, ReportConfigFile, ReportKind, ReportWindow,
    SprintSelector,
};
use crate::projection::resolve_columns;

/// Load a report configuration from disk.
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file.
/// * `kind` - Report the configuration is for.
/// * `credentials` - Credentials supplying the default base URL.
///
/// # Errors
///
/// Returns `JiraReportError::Config` if the configuration is missing or
/// invalid, and `JiraReportError::Mapping` if a display field is unknown.
pub fn load_report_configuration(
    path: &Path,
    kind: ReportKind,
    credentials: &Credentials,
) -> Result<ReportConfig, JiraReportError> {
    let contents = fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            JiraReportError::Config(format!(
                "configuration file not found: {}",
                path.display()
            ))
        } else {
            JiraReportError::Io(error.to_string())
        }
    })?;
    let file = parse_report_configuration(&contents)?;
    build_report_configuration(file, kind, credentials)
}

/// Parse the JSON text of a configuration file.
///
/// # Errors
///
/// Returns `JiraReportError::Config` if the text is not a valid config object.
pub fn parse_report_configuration(contents: &str) -> Result<ReportConfigFile, JiraReportError> {
    if contents.trim().is_empty() {
        return Err(JiraReportError::Config(
            "configuration file is empty".to_string(),
        ));
    }
    serde_json::from_str(contents)
        .map_err(|error| JiraReportError::Config(map_configuration_error(&error)))
}

/// Validate a parsed configuration file and resolve it for `kind`.
///
/// All rule violations are collected and reported together. Field names are
/// resolved to projection columns here, so a run never discovers an unknown
/// field mid-render.
///
/// # Errors
///
/// Returns `JiraReportError::Config` on rule violations and
/// `JiraReportError::Mapping` on unknown display fields.
pub fn build_report_configuration(
    file: ReportConfigFile,
    kind: ReportKind,
    credentials: &Credentials,
) -> Result<ReportConfig, JiraReportError> {
    let mut errors = Vec::new();

    let project_key = file
        .project_key
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if project_key.is_empty() {
        errors.push("project_key is required".to_string());
    }

    let window = resolve_window(&file, kind, &mut errors);

    let issue_types: Vec<String> = match file.issue_types {
        Some(types) => types
            .into_iter()
            .map(|issue_type| issue_type.trim().to_string())
            .collect(),
        None => DEFAULT_ISSUE_TYPES.iter().map(|t| t.to_string()).collect(),
    };
    validate_issue_types(&issue_types, &mut errors);

    let fields = match file.fields {
        Some(fields) if fields.is_empty() => {
            errors.push("fields must not be empty".to_string());
            Vec::new()
        }
        Some(fields) => fields,
        None => {
            errors.push("fields is required".to_string());
            Vec::new()
        }
    };

    let page_size = file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        errors.push(format!("page_size must be between 1 and {MAX_PAGE_SIZE}"));
    }

    let request_timeout_secs = file
        .request_timeout_secs
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if request_timeout_secs == 0 {
        errors.push("request_timeout_secs must be positive".to_string());
    }

    let api_version = match parse_api_version(file.api_version.as_deref()) {
        Ok(version) => version,
        Err(message) => {
            errors.push(message);
            ApiVersion::Auto
        }
    };

    let base_url = file
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(credentials.base_url.as_str())
        .trim_end_matches('/')
        .to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push("base_url must start with http:// or https://".to_string());
    }

    let output_basename = file
        .output_basename
        .unwrap_or_else(|| default_output_basename(kind));
    if output_basename.trim().is_empty() {
        errors.push("output_basename must not be empty".to_string());
    }

    let story_points_field = file
        .story_points_field
        .map(|field| field.trim().to_string())
        .filter(|field| !field.is_empty());

    if !errors.is_empty() {
        return Err(JiraReportError::Config(errors.join("; ")));
    }

    let columns = resolve_columns(&fields)?;

    Ok(ReportConfig {
        kind,
        project_key,
        issue_types,
        window: window.ok_or_else(|| {
            JiraReportError::Config("report window could not be resolved".to_string())
        })?,
        fields,
        columns,
        base_url,
        output_basename,
        page_size,
        api_version,
        request_timeout_secs,
        title: file.title.filter(|title| !title.trim().is_empty()),
        story_points_field,
        board_id: file.board_id,
    })
}

fn validate_issue_types(issue_types: &[String], errors: &mut Vec<String>) {
    if issue_types.iter().any(|issue_type| issue_type.is_empty()) {
        errors.push("issue_types must not contain empty names".to_string());
    }
    let mut seen = std::collections::HashSet::new();
    for issue_type in issue_types {
        if !seen.insert(issue_type.to_lowercase()) {
            errors.push(format!("duplicate issue type '{issue_type}'"));
            break;
        }
    }
}

fn resolve_window(
    file: &ReportConfigFile,
    kind: ReportKind,
    errors: &mut Vec<String>,
) -> Option<ReportWindow> {
    let has_sprint_keys =
        file.sprint.is_some() || file.sprint_id.is_some() || file.use_current_sprint.is_some();
    match kind {
        ReportKind::WeeklyUpdated => {
            if has_sprint_keys {
                errors.push("sprint selection is not valid for weekly_updated reports".to_string());
            }
            let days = file.lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
            if days == 0 {
                errors.push("lookback_days must be positive".to_string());
            }
            Some(ReportWindow::Lookback {
                days,
                style: file.lookback_style.unwrap_or_default(),
            })
        }
        ReportKind::SprintStatus => {
            if file.lookback_days.is_some() || file.lookback_style.is_some() {
                errors.push("lookback_days is not valid for sprint_status reports".to_string());
            }
            match resolve_sprint_selector(file) {
                Ok(selector) => Some(ReportWindow::Sprint(selector)),
                Err(message) => {
                    errors.push(message);
                    None
                }
            }
        }
    }
}

fn resolve_sprint_selector(file: &ReportConfigFile) -> Result<SprintSelector, String> {
    match (&file.sprint, file.sprint_id, file.use_current_sprint) {
        (Some(_), Some(_), _) => Err("set either sprint or sprint_id, not both".to_string()),
        (Some(SprintSelector::Name(name)), _, _) if name.trim().is_empty() => {
            Err("sprint name must not be empty".to_string())
        }
        (Some(selector), _, _) => Ok(selector.clone()),
        (None, Some(id), _) => Ok(SprintSelector::Id(id)),
        (None, None, Some(false)) => {
            Err("use_current_sprint is false but no sprint_id is configured".to_string())
        }
        (None, None, _) => Ok(SprintSelector::Active),
    }
}

fn parse_api_version(value: Option<&str>) -> Result<ApiVersion, String> {
    match value.map(str::trim) {
        None | Some("") | Some("auto") => Ok(ApiVersion::Auto),
        Some("2") => Ok(ApiVersion::V2),
        Some("3") => Ok(ApiVersion::V3),
        Some(other) => Err(format!(
            "api_version must be \"auto\", \"2\" or \"3\", got \"{other}\""
        )),
    }
}

fn map_configuration_error(error: &serde_json::Error) -> String {
    let message = error.to_string();
    if message.contains("unknown field") {
        return format!("unknown configuration field: {message}");
    }
    format!("invalid configuration: {message}")
}
