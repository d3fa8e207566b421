//! Projection of raw Jira issues onto flat report records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::JiraReportError;

/// Placeholder for missing values.
pub const MISSING_VALUE: &str = "—";

/// Placeholder for issues without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// How a column's value is extracted from an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// Top-level `key`.
    IssueKey,
    /// `fields.<name>` as text.
    Text,
    /// `fields.<name>.name`.
    Named,
    /// `fields.<name>.displayName`.
    Person,
    /// `fields.<name>` as a Jira timestamp.
    Timestamp,
    /// `fields.<name>[].name`, comma separated.
    NamedList,
    /// `fields.<name>[]` strings, comma separated.
    TextList,
    /// `fields.customfield_*` of any shape.
    Custom,
}

/// A resolved display column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Jira field name, as configured.
    pub field: String,
    /// Header label.
    pub label: String,
    pub rule: ExtractionRule,
    /// Value rendered when the issue has nothing for this field.
    pub placeholder: &'static str,
}

/// Field name → (label, rule, placeholder).
const PROJECTION_TABLE: &[(&str, &str, ExtractionRule, &str)] = &[
    ("key", "Key", ExtractionRule::IssueKey, MISSING_VALUE),
    ("summary", "Summary", ExtractionRule::Text, MISSING_VALUE),
    ("issuetype", "Type", ExtractionRule::Named, MISSING_VALUE),
    ("status", "Status", ExtractionRule::Named, MISSING_VALUE),
    ("assignee", "Assignee", ExtractionRule::Person, UNASSIGNED),
    ("reporter", "Reporter", ExtractionRule::Person, MISSING_VALUE),
    ("creator", "Creator", ExtractionRule::Person, MISSING_VALUE),
    ("priority", "Priority", ExtractionRule::Named, MISSING_VALUE),
    ("resolution", "Resolution", ExtractionRule::Named, MISSING_VALUE),
    ("created", "Created", ExtractionRule::Timestamp, MISSING_VALUE),
    ("updated", "Updated", ExtractionRule::Timestamp, MISSING_VALUE),
    ("resolutiondate", "Resolved", ExtractionRule::Timestamp, MISSING_VALUE),
    ("duedate", "Due", ExtractionRule::Text, MISSING_VALUE),
    ("components", "Components", ExtractionRule::NamedList, MISSING_VALUE),
    ("fixVersions", "Fix Versions", ExtractionRule::NamedList, MISSING_VALUE),
    ("versions", "Affects Versions", ExtractionRule::NamedList, MISSING_VALUE),
    ("labels", "Labels", ExtractionRule::TextList, MISSING_VALUE),
];

/// Resolve configured field names to columns.
///
/// # Errors
///
/// Returns `JiraReportError::Mapping` naming every field without a rule.
pub fn resolve_columns(fields: &[String]) -> Result<Vec<Column>, JiraReportError> {
    let mut columns = Vec::with_capacity(fields.len());
    let mut unknown = Vec::new();
    for field in fields {
        match resolve_column(field) {
            Some(column) => columns.push(column),
            None => unknown.push(format!("'{field}'")),
        }
    }
    if !unknown.is_empty() {
        return Err(JiraReportError::Mapping(format!(
            "no projection for field(s) {}",
            unknown.join(", ")
        )));
    }
    Ok(columns)
}

fn resolve_column(field: &str) -> Option<Column> {
    if let Some((name, label, rule, placeholder)) = PROJECTION_TABLE
        .iter()
        .find(|(name, ..)| *name == field)
    {
        return Some(Column {
            field: name.to_string(),
            label: label.to_string(),
            rule: *rule,
            placeholder: *placeholder,
        });
    }
    let suffix = field.strip_prefix(CUSTOM_FIELD_PREFIX)?;
    if suffix.is_empty() || !suffix.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    Some(Column {
        field: field.to_string(),
        label: field.to_string(),
        rule: ExtractionRule::Custom,
        placeholder: MISSING_VALUE,
    })
}

/// One issue projected onto the configured columns, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    cells: Vec<(String, String)>,
}

impl FlatRecord {
    /// Value for a field name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(field, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Project a raw issue onto `columns`.
pub fn flatten(issue: &Value, columns: &[Column]) -> FlatRecord {
    let cells = columns
        .iter()
        .map(|column| {
            let value = extract(issue, column)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| column.placeholder.to_string());
            (column.field.clone(), value)
        })
        .collect();
    FlatRecord { cells }
}

fn extract(issue: &Value, column: &Column) -> Option<String> {
    let field = &issue["fields"][column.field.as_str()];
    match column.rule {
        ExtractionRule::IssueKey => issue["key"].as_str().map(str::to_string),
        ExtractionRule::Text => scalar_text(field),
        ExtractionRule::Named => field["name"].as_str().map(str::to_string),
        ExtractionRule::Person => field["displayName"].as_str().map(str::to_string),
        ExtractionRule::Timestamp => field.as_str().map(format_jira_timestamp),
        ExtractionRule::NamedList => {
            join_list(field, |item| item["name"].as_str().map(str::to_string))
        }
        ExtractionRule::TextList => join_list(field, scalar_text),
        ExtractionRule::Custom => custom_text(field),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn custom_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => value["value"]
            .as_str()
            .or_else(|| value["name"].as_str())
            .or_else(|| value["displayName"].as_str())
            .map(str::to_string),
        Value::Array(_) => join_list(value, custom_text),
        other => scalar_text(other),
    }
}

fn join_list(value: &Value, item_text: impl Fn(&Value) -> Option<String>) -> Option<String> {
    let items: Vec<String> = value
        .as_array()?
        .iter()
        .filter_map(item_text)
        .filter(|text| !text.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    }
}

/// Parse a Jira timestamp such as `2026-10-14T08:05:12.000+0000`.
pub fn parse_jira_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Render a Jira timestamp as `YYYY-MM-DD HH:MM` UTC, or as-is if unparseable.
fn format_jira_timestamp(text: &str) -> String {
    match parse_jira_datetime(text) {
        Some(timestamp) => timestamp.format("%Y-%m-%d %H:%M").to_string(),
        None => text.to_string(),
    }
}
