//! Sprint aggregates: issue counts and story points per bucket.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Story point fields tried after the configured one.
pub const DEFAULT_STORY_POINT_FIELDS: [&str; 2] = ["customfield_10016", "customfield_10026"];

const UNKNOWN: &str = "Unknown";

/// Count and story points of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bucket {
    pub count: usize,
    pub story_points: f64,
}

/// Aggregates over all issues of a sprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SprintSummary {
    pub by_status: BTreeMap<String, Bucket>,
    pub by_category: BTreeMap<String, Bucket>,
    pub by_type: BTreeMap<String, Bucket>,
    pub total_story_points: f64,
    pub issue_count: usize,
}

impl SprintSummary {
    /// Buckets ordered case-insensitively by name.
    pub fn sorted(buckets: &BTreeMap<String, Bucket>) -> Vec<(&str, Bucket)> {
        let mut entries: Vec<(&str, Bucket)> = buckets
            .iter()
            .map(|(name, bucket)| (name.as_str(), *bucket))
            .collect();
        entries.sort_by(|(left, _), (right, _)| {
            left.to_lowercase()
                .cmp(&right.to_lowercase())
                .then_with(|| left.cmp(right))
        });
        entries
    }
}

/// Aggregate `issues` by status, status category and issue type.
pub fn summarize(issues: &[Value], story_points_field: Option<&str>) -> SprintSummary {
    let mut summary = SprintSummary::default();
    for issue in issues {
        let fields = &issue["fields"];
        let status = name_or_unknown(&fields["status"]["name"]);
        let category = name_or_unknown(&fields["status"]["statusCategory"]["name"]);
        let issue_type = name_or_unknown(&fields["issuetype"]["name"]);
        let points = story_points(fields, story_points_field);

        for (buckets, key) in [
            (&mut summary.by_status, status),
            (&mut summary.by_category, category),
            (&mut summary.by_type, issue_type),
        ] {
            let bucket = buckets.entry(key).or_default();
            bucket.count += 1;
            bucket.story_points += points;
        }
        summary.total_story_points += points;
        summary.issue_count += 1;
    }
    summary
}

/// Fields a sprint summary needs from the search endpoint.
pub fn summary_fields(story_points_field: Option<&str>) -> Vec<String> {
    let mut fields = vec!["status".to_string(), "issuetype".to_string()];
    fields.extend(story_points_field.map(str::to_string));
    fields.extend(DEFAULT_STORY_POINT_FIELDS.iter().map(|field| field.to_string()));
    fields
}

fn name_or_unknown(value: &Value) -> String {
    value
        .as_str()
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn story_points(fields: &Value, configured: Option<&str>) -> f64 {
    configured
        .into_iter()
        .chain(DEFAULT_STORY_POINT_FIELDS)
        .find_map(|field| parse_points(&fields[field]))
        .unwrap_or(0.0)
}

fn parse_points(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(status: &str, category: &str, issue_type: &str, points: Value) -> Value {
        json!({"fields": {
            "status": {"name": status, "statusCategory": {"name": category}},
            "issuetype": {"name": issue_type},
            "customfield_10016": points
        }})
    }

    #[test]
    fn aggregates_counts_and_points() {
        let issues = vec![
            issue("In Progress", "In Progress", "Story", json!(3)),
            issue("Done", "Done", "Story", json!("5")),
            issue("Done", "Done", "Bug", Value::Null),
        ];
        let summary = summarize(&issues, None);
        assert_eq!(summary.issue_count, 3);
        assert_eq!(summary.total_story_points, 8.0);
        assert_eq!(
            summary.by_status["Done"],
            Bucket {
                count: 2,
                story_points: 5.0
            }
        );
        assert_eq!(summary.by_type["Story"].count, 2);
        assert_eq!(summary.by_category["In Progress"].story_points, 3.0);
    }

    #[test]
    fn configured_field_wins_over_defaults() {
        let issue = json!({"fields": {"customfield_20000": 2.5, "customfield_10016": 8}});
        let summary = summarize(&[issue], Some("customfield_20000"));
        assert_eq!(summary.total_story_points, 2.5);
    }

    #[test]
    fn missing_names_fall_into_unknown() {
        let summary = summarize(&[json!({"fields": {}})], None);
        assert_eq!(summary.by_status["Unknown"].count, 1);
        assert_eq!(summary.by_category["Unknown"].count, 1);
        assert_eq!(summary.by_type["Unknown"].count, 1);
    }

    #[test]
    fn sorted_is_case_insensitive() {
        let issues = vec![
            issue("b", "x", "t", Value::Null),
            issue("A", "x", "t", Value::Null),
            issue("C", "x", "t", Value::Null),
        ];
        let summary = summarize(&issues, None);
        let names: Vec<&str> = SprintSummary::sorted(&summary.by_status)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["A", "b", "C"]);
    }

    #[test]
    fn summary_fields_include_story_points() {
        assert_eq!(
            summary_fields(Some("customfield_1")),
            vec![
                "status",
                "issuetype",
                "customfield_1",
                "customfield_10016",
                "customfield_10026"
            ]
        );
    }
}
