//! Report rendering: raw JSON document and HTML table.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use crate::error::JiraReportError;
use crate::models::{RawReportDocument, SprintInfo};
use crate::projection::{flatten, Column, ExtractionRule, MISSING_VALUE};
use crate::sprint_summary::{Bucket, SprintSummary};

const REPORT_TEMPLATE_NAME: &str = "report.html";

const REPORT_TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
  <style>
    body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; margin: 24px; }
    h1, h2, h3 { margin-bottom: 8px; }
    .meta, .section { color: #555; margin-bottom: 16px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border: 1px solid #ddd; padding: 8px; vertical-align: top; }
    th { background: #f7f7f7; text-align: left; }
    tr:nth-child(even) { background: #fafafa; }
    a { text-decoration: none; }
  </style>
</head>
<body>
  <h1>{{ title }}</h1>
  <div class="meta">{{ count }} issues. JQL: <code>{{ jql }}</code></div>
{%- if sprint %}
  <div class="section">
    <table>
{%- for row in sprint.details %}
      <tr><td>{{ row.label }}</td><td>{{ row.value }}</td></tr>
{%- endfor %}
    </table>
  </div>
{%- for group in sprint.groups %}
  <div class="section">
    <h3>{{ group.title }}</h3>
    <table>
      <tr><th>Name</th><th>Count</th><th>Story Points</th></tr>
{%- for bucket in group.buckets %}
      <tr><td>{{ bucket.name }}</td><td>{{ bucket.count }}</td><td>{{ bucket.story_points }}</td></tr>
{%- endfor %}
    </table>
  </div>
{%- endfor %}
  <h2>Issues</h2>
{%- endif %}
  <table>
    <tr>{% for label in labels %}<th>{{ label }}</th>{% endfor %}</tr>
{%- for row in rows %}
    <tr class="issue">{% for cell in row %}<td>{% if cell.link %}<a href="{{ cell.link }}">{{ cell.value }}</a>{% else %}{{ cell.value }}{% endif %}</td>{% endfor %}</tr>
{%- endfor %}
  </table>
</body>
</html>
"#;

/// Sprint details shown above the issue table.
#[derive(Debug, Clone)]
pub struct SprintSection {
    pub project_key: String,
    pub sprint: SprintInfo,
    pub summary: SprintSummary,
}

/// Presentation inputs besides the document itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub title: String,
    pub sprint: Option<SprintSection>,
}

/// Rendered output file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub json: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct CellView {
    value: String,
    link: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetailView {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct BucketView {
    name: String,
    count: usize,
    story_points: String,
}

#[derive(Debug, Serialize)]
struct GroupView {
    title: &'static str,
    buckets: Vec<BucketView>,
}

#[derive(Debug, Serialize)]
struct SprintView {
    details: Vec<DetailView>,
    groups: Vec<GroupView>,
}

/// Render the raw JSON document and the HTML table for a report.
///
/// Pure: no network or filesystem access. Cell values are HTML-escaped by
/// the template engine.
///
/// # Errors
///
/// Returns `JiraReportError::Render` if serialization or templating fails.
pub fn render(
    document: &RawReportDocument,
    columns: &[Column],
    base_url: &str,
    options: &RenderOptions,
) -> Result<RenderedReport, JiraReportError> {
    let json = render_json(document)?;
    let html = render_html(document, columns, base_url, options)?;
    Ok(RenderedReport { json, html })
}

/// Pretty-printed `{issues, count, jql}`.
///
/// # Errors
///
/// Returns `JiraReportError::Render` if serialization fails.
pub fn render_json(document: &RawReportDocument) -> Result<String, JiraReportError> {
    serde_json::to_string_pretty(document).map_err(|error| JiraReportError::Render(error.to_string()))
}

/// Browse URL for an issue key.
pub fn issue_link(base_url: &str, key: &str) -> String {
    format!("{}/browse/{key}", base_url.trim_end_matches('/'))
}

fn render_html(
    document: &RawReportDocument,
    columns: &[Column],
    base_url: &str,
    options: &RenderOptions,
) -> Result<String, JiraReportError> {
    let rows: Vec<Vec<CellView>> = document
        .issues
        .iter()
        .map(|issue| {
            let record = flatten(issue, columns);
            columns
                .iter()
                .zip(record.iter())
                .map(|(column, (_, value))| CellView {
                    link: (column.rule == ExtractionRule::IssueKey && value != MISSING_VALUE)
                        .then(|| issue_link(base_url, value)),
                    value: value.to_string(),
                })
                .collect()
        })
        .collect();
    let labels: Vec<&str> = columns.iter().map(|column| column.label.as_str()).collect();
    let sprint = options.sprint.as_ref().map(sprint_view);

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)
        .map_err(|error| JiraReportError::Render(error.to_string()))?;
    let template = env
        .get_template(REPORT_TEMPLATE_NAME)
        .map_err(|error| JiraReportError::Render(error.to_string()))?;
    template
        .render(context! {
            title => options.title,
            count => document.count,
            jql => document.jql,
            labels => labels,
            rows => rows,
            sprint => sprint,
        })
        .map_err(|error| JiraReportError::Render(error.to_string()))
}

fn sprint_view(section: &SprintSection) -> SprintView {
    let sprint = &section.sprint;
    let mut details = vec![DetailView {
        label: "Project",
        value: section.project_key.clone(),
    }];
    if let Some(board) = &sprint.board {
        details.push(DetailView {
            label: "Board",
            value: format!("{} (#{})", board.name, board.id),
        });
    }
    details.push(DetailView {
        label: "Sprint",
        value: match sprint.id {
            Some(id) => format!("{} (#{id})", sprint.name),
            None => sprint.name.clone(),
        },
    });
    if sprint.start_date.is_some() || sprint.end_date.is_some() {
        details.push(DetailView {
            label: "Dates",
            value: format!(
                "{} → {}",
                sprint.start_date.as_deref().unwrap_or(MISSING_VALUE),
                sprint.end_date.as_deref().unwrap_or(MISSING_VALUE)
            ),
        });
    }
    details.push(DetailView {
        label: "Issues",
        value: section.summary.issue_count.to_string(),
    });
    details.push(DetailView {
        label: "Story Points (total)",
        value: format!("{:.2}", section.summary.total_story_points),
    });

    let groups = vec![
        group_view("By Status", &section.summary.by_status),
        group_view("By Category", &section.summary.by_category),
        group_view("By Issue Type", &section.summary.by_type),
    ];
    SprintView { details, groups }
}

fn group_view(
    title: &'static str,
    buckets: &std::collections::BTreeMap<String, Bucket>,
) -> GroupView {
    GroupView {
        title,
        buckets: SprintSummary::sorted(buckets)
            .into_iter()
            .map(|(name, bucket)| BucketView {
                name: name.to_string(),
                count: bucket.count,
                story_points: format!("{:.2}", bucket.story_points),
            })
            .collect(),
    }
}
