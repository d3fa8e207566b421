//! Jira credentials.
//!
//! Built once by the entrypoint from `JIRA_EMAIL`, `JIRA_API_TOKEN` and
//! `JIRA_BASE_URL`, then passed by reference to whatever needs them.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};

use crate::error::JiraReportError;

pub const EMAIL_VARIABLE: &str = "JIRA_EMAIL";
pub const API_TOKEN_VARIABLE: &str = "JIRA_API_TOKEN";
pub const BASE_URL_VARIABLE: &str = "JIRA_BASE_URL";

/// Basic-auth credentials and the Jira site they belong to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
    pub base_url: String,
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from an environment snapshot.
    ///
    /// Values are trimmed; blank values count as missing. Every missing
    /// variable is named in the error.
    ///
    /// # Errors
    ///
    /// Returns `JiraReportError::Config` if any variable is missing.
    pub fn from_environment(environment: &BTreeMap<String, String>) -> Result<Self, JiraReportError> {
        let lookup = |name: &str| {
            environment
                .get(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let email = lookup(EMAIL_VARIABLE);
        let api_token = lookup(API_TOKEN_VARIABLE);
        let base_url = lookup(BASE_URL_VARIABLE);

        match (email, api_token, base_url) {
            (Some(email), Some(api_token), Some(base_url)) => Ok(Credentials {
                email,
                api_token,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
            (email, api_token, base_url) => {
                let missing: Vec<&str> = [
                    (EMAIL_VARIABLE, email.is_none()),
                    (API_TOKEN_VARIABLE, api_token.is_none()),
                    (BASE_URL_VARIABLE, base_url.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect();
                Err(JiraReportError::Config(format!(
                    "missing environment variable(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
