//! Jira REST client and paginated issue search.
//!
//! All requests are blocking and authenticated with basic auth (email + API
//! token). The token is attached to requests only; it never reaches logs or
//! report output.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::JiraReportError;
use crate::models::ApiVersion;

/// Upper bound on search pages per query.
pub const MAX_PAGES: usize = 10_000;

/// Longest error body kept in an `ApiError`.
const ERROR_BODY_LIMIT: usize = 600;

const USER_AGENT: &str = concat!("jira-report/", env!("CARGO_PKG_VERSION"));

/// One page of the search endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Value>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub start_at: Option<usize>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Parameters of a single page request.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub jql: &'a str,
    pub fields: &'a [String],
    pub start_at: usize,
    pub max_results: u32,
}

/// Anything that can answer one search page.
pub trait SearchPageSource {
    /// Fetch the page described by `request`.
    ///
    /// # Errors
    ///
    /// Returns `JiraReportError` if the page cannot be fetched or decoded.
    fn search_page(&self, request: &SearchRequest<'_>) -> Result<SearchPage, JiraReportError>;
}

/// Fetch every issue matching `jql`, page by page.
///
/// Each request starts at the number of issues fetched so far. The loop ends
/// when that count reaches the server's `total`, when a page comes back
/// empty, or when a page omits `total`. Issues keep server order.
///
/// # Errors
///
/// Returns the first page error unchanged; no partial result is returned.
pub fn fetch_all(
    source: &impl SearchPageSource,
    jql: &str,
    fields: &[String],
    page_size: u32,
) -> Result<Vec<Value>, JiraReportError> {
    fetch_all_bounded(source, jql, fields, page_size, MAX_PAGES)
}

/// [`fetch_all`] with an explicit page bound.
///
/// # Errors
///
/// Returns `JiraReportError::Response` when `max_pages` pages did not
/// exhaust the result set.
pub fn fetch_all_bounded(
    source: &impl SearchPageSource,
    jql: &str,
    fields: &[String],
    page_size: u32,
    max_pages: usize,
) -> Result<Vec<Value>, JiraReportError> {
    let mut issues: Vec<Value> = Vec::new();
    for page_number in 0..max_pages {
        let request = SearchRequest {
            jql,
            fields,
            start_at: issues.len(),
            max_results: page_size,
        };
        let page = source.search_page(&request)?;
        let received = page.issues.len();
        let total = page.total.unwrap_or(issues.len() + received);
        debug!(
            page = page_number + 1,
            start_at = request.start_at,
            received,
            total,
            "search page"
        );
        issues.extend(page.issues);
        if received == 0 || issues.len() >= total {
            return Ok(issues);
        }
    }
    Err(JiraReportError::Response(format!(
        "search did not finish within {max_pages} pages ({} issues fetched)",
        issues.len()
    )))
}

/// Blocking Jira REST client bound to one site and one set of credentials.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl JiraClient {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `JiraReportError::Transport` if the HTTP client cannot be built.
    pub fn new(
        credentials: &Credentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, JiraReportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(JiraClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document from `path` (relative to the site root).
    ///
    /// # Errors
    ///
    /// * `JiraReportError::Transport` when no response arrives.
    /// * `JiraReportError::Api` for non-2xx responses.
    /// * `JiraReportError::Response` for bodies that are not JSON.
    pub fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, JiraReportError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .query(query)
            .basic_auth(&self.credentials.email, Some(&self.credentials.api_token))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        let redirected = Url::parse(&url)
            .map(|requested| !same_endpoint(&requested, response.url()))
            .unwrap_or(false);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        debug!(status = status.as_u16(), %content_type, redirected, "response");

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(JiraReportError::Api {
                status_code: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let body = response.text()?;
        if !content_type.to_ascii_lowercase().contains("json") {
            let hint = if redirected {
                " (request was redirected, likely to an SSO login page; check API token auth)"
            } else {
                ""
            };
            return Err(JiraReportError::Response(format!(
                "expected JSON from {path} but got Content-Type '{content_type}'{hint}: {}",
                truncate(&body, ERROR_BODY_LIMIT)
            )));
        }

        serde_json::from_str(&body).map_err(|error| {
            JiraReportError::Response(format!("failed to decode JSON from {path}: {error}"))
        })
    }

    /// Search endpoint for a concrete REST API version.
    pub fn search_endpoint<'a>(&'a self, version: &'a str) -> SearchEndpoint<'a> {
        SearchEndpoint {
            client: self,
            version,
        }
    }
}

/// `/rest/api/<version>/search` on a [`JiraClient`].
#[derive(Debug, Clone, Copy)]
pub struct SearchEndpoint<'a> {
    client: &'a JiraClient,
    version: &'a str,
}

impl SearchPageSource for SearchEndpoint<'_> {
    fn search_page(&self, request: &SearchRequest<'_>) -> Result<SearchPage, JiraReportError> {
        let path = format!("/rest/api/{}/search", self.version);
        let query = [
            ("jql", request.jql.to_string()),
            ("startAt", request.start_at.to_string()),
            ("maxResults", request.max_results.to_string()),
            ("fields", request.fields.join(",")),
        ];
        let body = self.client.get_json(&path, &query)?;
        if !body["issues"].is_array() {
            return Err(JiraReportError::Response(
                "search response is missing 'issues'".to_string(),
            ));
        }
        serde_json::from_value(body).map_err(|error| {
            JiraReportError::Response(format!("unexpected search response: {error}"))
        })
    }
}

/// Search all issues, trying each REST version `api_version` allows.
///
/// A version is abandoned only when it answers HTTP 404; any other failure
/// ends the search.
///
/// # Errors
///
/// Returns the error of the last version tried.
pub fn search_issues(
    client: &JiraClient,
    api_version: ApiVersion,
    jql: &str,
    fields: &[String],
    page_size: u32,
) -> Result<Vec<Value>, JiraReportError> {
    let candidates = api_version.candidates();
    let mut last_error = None;
    for (index, version) in candidates.iter().enumerate() {
        debug!(version, "searching with REST API version");
        match fetch_all(&client.search_endpoint(version), jql, fields, page_size) {
            Ok(issues) => return Ok(issues),
            Err(error) if error.status_code() == Some(404) && index + 1 < candidates.len() => {
                warn!(version, "search endpoint not found, trying next API version");
                last_error = Some(error);
            }
            Err(error) => return Err(error),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        JiraReportError::Config("no REST API version to search with".to_string())
    }))
}

/// Whether a response URL is the endpoint that was requested, ignoring the
/// query string and spelling differences the URL parser normalizes away.
fn same_endpoint(requested: &Url, answered: &Url) -> bool {
    requested.scheme() == answered.scheme()
        && requested.host_str() == answered.host_str()
        && requested.port_or_known_default() == answered.port_or_known_default()
        && requested.path() == answered.path()
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}…", &text[..index]),
        None => text.to_string(),
    }
}
