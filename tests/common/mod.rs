#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{json, Value};

pub const EMAIL: &str = "reporter@example.com";
pub const API_TOKEN: &str = "tok-3f9a-not-for-output";

/// Environment holding credentials for a mock Jira at `base_url`.
pub fn environment(base_url: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("JIRA_EMAIL".to_string(), EMAIL.to_string()),
        ("JIRA_API_TOKEN".to_string(), API_TOKEN.to_string()),
        ("JIRA_BASE_URL".to_string(), base_url.to_string()),
    ])
}

/// Write `configs/<name>.json` under `root`.
pub fn write_config(root: &Path, name: &str, config: &Value) {
    let configs = root.join("configs");
    fs::create_dir_all(&configs).expect("create configs dir");
    let contents = serde_json::to_string_pretty(config).expect("serialize config");
    fs::write(configs.join(format!("{name}.json")), contents).expect("write config");
}

/// Weekly config for project ABC, bugs, 7 days.
pub fn weekly_config(page_size: u32) -> Value {
    json!({
        "project_key": "ABC",
        "issue_types": ["Bug"],
        "lookback_days": 7,
        "fields": ["key", "summary", "status", "assignee", "updated"],
        "page_size": page_size,
        "request_timeout_secs": 5
    })
}

/// A raw issue as the search endpoint returns it.
pub fn issue(key: &str, summary: &str) -> Value {
    json!({
        "id": key.trim_start_matches("ABC-"),
        "key": key,
        "fields": {
            "summary": summary,
            "status": {"name": "In Progress", "statusCategory": {"name": "In Progress"}},
            "issuetype": {"name": "Bug"},
            "assignee": {"displayName": "Grace Hopper"},
            "updated": "2026-10-15T10:00:00.000+0000",
            "customfield_10016": 2
        }
    })
}

/// One search response page.
pub fn search_page(issues: &[Value], start_at: usize, max_results: usize, total: usize) -> Value {
    json!({
        "startAt": start_at,
        "maxResults": max_results,
        "total": total,
        "issues": issues
    })
}

pub fn read_json(path: &Path) -> Value {
    let contents = fs::read_to_string(path).expect("read json output");
    serde_json::from_str(&contents).expect("parse json output")
}
