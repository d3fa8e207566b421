//! JQL construction for report queries.

use chrono::{DateTime, Duration, Utc};

use crate::models::{LookbackStyle, ReportConfig, ReportWindow, SprintSelector};

/// Build the JQL for a report.
///
/// Pure: the only time input is `now`, which absolute lookback windows are
/// anchored to.
pub fn build_jql(config: &ReportConfig, now: DateTime<Utc>) -> String {
    let mut clauses = vec![format!("project = {}", quote_jql(&config.project_key))];
    if !config.issue_types.is_empty() {
        let quoted: Vec<String> = config
            .issue_types
            .iter()
            .map(|issue_type| quote_jql(issue_type))
            .collect();
        clauses.push(format!("issuetype in ({})", quoted.join(", ")));
    }

    let order_by = match &config.window {
        ReportWindow::Lookback { days, style } => {
            clauses.push(lookback_clause(*days, *style, now));
            "updated DESC"
        }
        ReportWindow::Sprint(selector) => {
            clauses.push(sprint_clause(selector));
            "Rank ASC"
        }
    };

    format!("{} ORDER BY {order_by}", clauses.join(" AND "))
}

/// Quote a value as a JQL string literal.
pub fn quote_jql(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn lookback_clause(days: u32, style: LookbackStyle, now: DateTime<Utc>) -> String {
    match style {
        LookbackStyle::Relative => format!("updated >= -{days}d"),
        LookbackStyle::Absolute => {
            let boundary = now - Duration::days(i64::from(days));
            format!("updated >= \"{}\"", boundary.format("%Y-%m-%d %H:%M"))
        }
    }
}

fn sprint_clause(selector: &SprintSelector) -> String {
    match selector {
        SprintSelector::Active => "sprint in openSprints()".to_string(),
        SprintSelector::Id(id) => format!("sprint = {id}"),
        SprintSelector::Name(name) => format!("sprint = {}", quote_jql(name)),
    }
}
