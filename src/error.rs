//! Error types for jira-report.

use thiserror::Error;

/// Errors returned by report operations.
///
/// Every variant is fatal to a run: the entrypoint prints the message and
/// exits non-zero without writing any output file.
#[derive(Debug, Error)]
pub enum JiraReportError {
    /// Configuration file, environment variable, or CLI argument problem.
    #[error("ConfigError: {0}")]
    Config(String),
    /// Jira answered with a non-2xx status.
    #[error("ApiError: HTTP {status_code}: {body}")]
    Api { status_code: u16, body: String },
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("TransportError: {0}")]
    Transport(String),
    /// A configured field has no projection rule.
    #[error("MappingError: {0}")]
    Mapping(String),
    /// Jira answered 2xx with a body we cannot use.
    #[error("ResponseError: {0}")]
    Response(String),
    /// The HTML template failed to render.
    #[error("RenderError: {0}")]
    Render(String),
    /// Reading configuration or writing report files failed.
    #[error("IoError: {0}")]
    Io(String),
}

impl JiraReportError {
    /// HTTP status carried by an `Api` error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            JiraReportError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for JiraReportError {
    fn from(error: reqwest::Error) -> Self {
        // reqwest renders the request URL, never the Authorization header.
        JiraReportError::Transport(error.to_string())
    }
}
