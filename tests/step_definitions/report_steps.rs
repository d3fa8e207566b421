use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use cucumber::{given, then, when, World};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{environment, issue, read_json, search_page, weekly_config, write_config};
use jira_report::cli::run_from_args_with_output;

#[derive(Default, World)]
pub struct ReportWorld {
    pub server: Option<MockServer>,
    pub temp_dir: Option<TempDir>,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl fmt::Debug for ReportWorld {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReportWorld")
            .field("server", &self.server.as_ref().map(MockServer::uri))
            .field("temp_dir", &self.temp_dir)
            .field("exit_code", &self.exit_code)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .finish()
    }
}

impl ReportWorld {
    fn root(&mut self) -> PathBuf {
        self.temp_dir
            .get_or_insert_with(|| TempDir::new().expect("tempdir"))
            .path()
            .to_path_buf()
    }

    fn server(&self) -> &MockServer {
        self.server.as_ref().expect("jira server not started")
    }

    async fn start_server(&mut self) -> &MockServer {
        if self.server.is_none() {
            self.server = Some(MockServer::start().await);
        }
        self.server()
    }
}

#[given(expr = "a Jira server with {int} updated issues served {int} per page")]
async fn given_paged_issues(world: &mut ReportWorld, total: usize, per_page: usize) {
    let server = world.start_server().await;
    let issues: Vec<_> = (1..=total)
        .map(|number| issue(&format!("ABC-{number}"), &format!("Issue {number}")))
        .collect();
    for (page, chunk) in issues.chunks(per_page.max(1)).enumerate() {
        let start_at = page * per_page;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("startAt", start_at.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
                chunk, start_at, per_page, total,
            )))
            .mount(server)
            .await;
    }
}

#[given(expr = "a Jira server that rejects every request with status {int}")]
async fn given_rejecting_server(world: &mut ReportWorld, status: u16) {
    let server = world.start_server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("Unauthorized"))
        .mount(server)
        .await;
}

#[given(expr = "a Jira server with active sprint {string} numbered {int} on board {int}")]
async fn given_active_sprint(world: &mut ReportWorld, name: String, sprint_id: u64, board_id: u64) {
    let server = world.start_server().await;
    Mock::given(method("GET"))
        .and(path(format!("/rest/agile/1.0/board/{board_id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": board_id, "name": "ABC scrum", "type": "scrum"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/rest/agile/1.0/board/{board_id}/sprint")))
        .and(query_param("state", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": [
            {"id": sprint_id, "name": name, "state": "active"}
        ]})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            &[issue("ABC-1", "Sprint work"), issue("ABC-2", "More sprint work")],
            0,
            50,
            2,
        )))
        .mount(server)
        .await;
}

#[given(expr = "a weekly report configuration with page size {int}")]
fn given_weekly_configuration(world: &mut ReportWorld, page_size: u32) {
    let root = world.root();
    write_config(&root, "weekly_updated", &weekly_config(page_size));
}

#[given("a weekly report configuration without fields")]
fn given_weekly_configuration_without_fields(world: &mut ReportWorld) {
    let root = world.root();
    write_config(
        &root,
        "weekly_updated",
        &json!({"project_key": "ABC", "issue_types": ["Bug"], "lookback_days": 7}),
    );
}

#[given(expr = "a sprint report configuration for board {int}")]
fn given_sprint_configuration(world: &mut ReportWorld, board_id: u64) {
    let root = world.root();
    write_config(
        &root,
        "sprint_status",
        &json!({
            "project_key": "ABC",
            "issue_types": ["Bug"],
            "fields": ["key", "summary", "status"],
            "board_id": board_id
        }),
    );
}

#[when(expr = "I run {string}")]
async fn when_run_command(world: &mut ReportWorld, command: String) {
    let args = shell_words::split(&command).expect("parse command");
    let root = world.root();
    let env: BTreeMap<String, String> = environment(&world.server().uri());
    let result = tokio::task::spawn_blocking(move || {
        run_from_args_with_output(args, &root, &env)
    })
    .await
    .expect("join report run");
    match result {
        Ok(output) => {
            world.exit_code = Some(0);
            world.stdout = Some(output.stdout);
            world.stderr = Some(String::new());
        }
        Err(error) => {
            world.exit_code = Some(1);
            world.stdout = Some(String::new());
            world.stderr = Some(error.to_string());
        }
    }
}

#[then("the command succeeds")]
fn then_command_succeeds(world: &mut ReportWorld) {
    assert_eq!(world.exit_code, Some(0), "stderr: {:?}", world.stderr);
}

#[then("the command fails")]
fn then_command_fails(world: &mut ReportWorld) {
    assert_eq!(world.exit_code, Some(1));
}

#[then(expr = "stdout contains {string}")]
fn then_stdout_contains(world: &mut ReportWorld, text: String) {
    let stdout = world.stdout.as_deref().unwrap_or_default();
    assert!(stdout.contains(&text), "stdout was: {stdout}");
}

#[then(expr = "stderr contains {string}")]
fn then_stderr_contains(world: &mut ReportWorld, text: String) {
    let stderr = world.stderr.as_deref().unwrap_or_default();
    assert!(stderr.contains(&text), "stderr was: {stderr}");
}

#[then(expr = "the raw JSON report {string} lists {int} issues")]
fn then_raw_report_lists(world: &mut ReportWorld, basename: String, count: usize) {
    let root = world.root();
    let document = read_json(&root.join(format!("{basename}_raw.json")));
    assert_eq!(document["count"], count);
    assert_eq!(
        document["issues"].as_array().map(Vec::len),
        Some(count)
    );
}

#[then(expr = "the HTML report {string} has {int} issue rows")]
fn then_html_rows(world: &mut ReportWorld, basename: String, rows: usize) {
    let root = world.root();
    let html = fs::read_to_string(root.join(format!("{basename}.html"))).expect("read html");
    assert_eq!(html.matches("<tr class=\"issue\">").count(), rows);
}

#[then(expr = "the HTML report {string} contains {string}")]
fn then_html_contains(world: &mut ReportWorld, basename: String, text: String) {
    let root = world.root();
    let html = fs::read_to_string(root.join(format!("{basename}.html"))).expect("read html");
    assert!(html.contains(&text), "html was: {html}");
}

#[then(expr = "no report files exist for {string}")]
fn then_no_report_files(world: &mut ReportWorld, basename: String) {
    let root = world.root();
    assert!(!root.join(format!("{basename}_raw.json")).exists());
    assert!(!root.join(format!("{basename}.html")).exists());
}

#[then(expr = "the Jira server received {int} requests")]
async fn then_server_received(world: &mut ReportWorld, count: usize) {
    let received = world
        .server()
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default();
    assert_eq!(received, count);
}
