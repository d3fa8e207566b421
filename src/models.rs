//! jira-report data models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::projection::Column;

/// Which report a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    WeeklyUpdated,
    SprintStatus,
}

impl ReportKind {
    /// Short name used in messages and default output names.
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::WeeklyUpdated => "weekly_updated",
            ReportKind::SprintStatus => "sprint_status",
        }
    }
}

/// How the weekly lookback boundary is written into JQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookbackStyle {
    /// `updated >= -7d`, resolved by Jira at query time.
    #[default]
    Relative,
    /// `updated >= "2026-10-11 09:30"`, computed from the injected clock.
    Absolute,
}

/// Sprint selection for sprint-status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintSelector {
    Active,
    Id(u64),
    Name(String),
}

/// Issue window, one variant per report kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportWindow {
    Lookback { days: u32, style: LookbackStyle },
    Sprint(SprintSelector),
}

/// Jira REST API version used for search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    /// Try v3, fall back to v2 when v3 answers 404.
    #[default]
    Auto,
    V2,
    V3,
}

impl ApiVersion {
    /// Concrete versions to try, in order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ApiVersion::Auto => &["3", "2"],
            ApiVersion::V2 => &["2"],
            ApiVersion::V3 => &["3"],
        }
    }
}

/// Report configuration as written in the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfigFile {
    #[serde(default, alias = "project")]
    pub project_key: Option<String>,
    #[serde(default)]
    pub issue_types: Option<Vec<String>>,
    #[serde(default, alias = "days")]
    pub lookback_days: Option<u32>,
    #[serde(default)]
    pub lookback_style: Option<LookbackStyle>,
    #[serde(default)]
    pub sprint: Option<SprintSelector>,
    #[serde(default)]
    pub sprint_id: Option<u64>,
    #[serde(default)]
    pub use_current_sprint: Option<bool>,
    #[serde(default)]
    pub board_id: Option<u64>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub output_basename: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub story_points_field: Option<String>,
}

/// Validated report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub kind: ReportKind,
    pub project_key: String,
    pub issue_types: Vec<String>,
    pub window: ReportWindow,
    pub fields: Vec<String>,
    /// Display columns resolved from `fields`.
    pub columns: Vec<Column>,
    pub base_url: String,
    pub output_basename: String,
    pub page_size: u32,
    pub api_version: ApiVersion,
    pub request_timeout_secs: u64,
    pub title: Option<String>,
    pub story_points_field: Option<String>,
    pub board_id: Option<u64>,
}

/// Document persisted to `<basename>_raw.json`.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReportDocument {
    pub issues: Vec<Value>,
    pub count: usize,
    pub jql: String,
}

impl RawReportDocument {
    /// Build a document whose `count` always matches its issues.
    pub fn new(issues: Vec<Value>, jql: String) -> Self {
        let count = issues.len();
        RawReportDocument { issues, count, jql }
    }
}

/// Board a sprint belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub id: u64,
    pub name: String,
}

/// Sprint described in the sprint-status header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintInfo {
    pub id: Option<u64>,
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub board: Option<BoardInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_document_serializes_keys_in_declared_order() {
        let document = RawReportDocument::new(vec![json!({"key": "ABC-1"})], "jql".to_string());
        let text = serde_json::to_string(&document).expect("serialize");
        assert_eq!(text, r#"{"issues":[{"key":"ABC-1"}],"count":1,"jql":"jql"}"#);
    }

    #[test]
    fn sprint_selector_accepts_active_id_and_name() {
        let active: SprintSelector = serde_json::from_str(r#""active""#).expect("active");
        let id: SprintSelector = serde_json::from_str(r#"{"id": 42}"#).expect("id");
        let name: SprintSelector =
            serde_json::from_str(r#"{"name": "Sprint 5"}"#).expect("name");
        assert_eq!(active, SprintSelector::Active);
        assert_eq!(id, SprintSelector::Id(42));
        assert_eq!(name, SprintSelector::Name("Sprint 5".to_string()));
    }

    #[test]
    fn config_file_accepts_legacy_aliases() {
        let file: ReportConfigFile =
            serde_json::from_str(r#"{"project": "BUILD", "days": 14}"#).expect("parse");
        assert_eq!(file.project_key.as_deref(), Some("BUILD"));
        assert_eq!(file.lookback_days, Some(14));
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let result = serde_json::from_str::<ReportConfigFile>(r#"{"projcet": "BUILD"}"#);
        assert!(result.is_err());
    }
}
