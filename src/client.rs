//! HTTP client for the LiveGrep search server
//!
//! Thin wrapper over the three server endpoints: `/search`, `/file-content`
//! and `/call-hierarchy`. All search, file parsing and call-graph logic is
//! server-side; this module only shapes requests and classifies responses.

use serde_json::Value;
use thiserror::Error;

use crate::types::{CallHierarchy, FileContext, SearchResponse};

/// Number of surrounding lines requested in each direction for a context
/// lookup.
pub const CONTEXT_LINES: u64 = 20;

/// Maximum caller-tree depth requested from the server.
pub const MAX_HIERARCHY_DEPTH: u64 = 10;

/// Errors surfaced by server requests. Cancellation is not represented
/// here: a superseded request is aborted and its result is never observed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered non-2xx with an `error` field in the body.
    #[error("{0}")]
    Server(String),

    /// The server answered non-2xx without a usable error message.
    #[error("Server error: {0}")]
    Status(u16),

    /// The response body did not have the documented shape.
    #[error("Invalid response format from server")]
    InvalidFormat,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for one LiveGrep server instance.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a search. `limit` of 0 requests an unbounded (full) search.
    pub async fn search(
        &self,
        path: &str,
        pattern: &str,
        limit: u64,
    ) -> Result<SearchResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("path", path), ("pattern", pattern)])
            .query(&[("limit", limit)])
            .send()
            .await?;
        let body = Self::check_status(response).await?;

        // The results field is validated by hand so a present-but-wrong
        // shape maps to InvalidFormat instead of a serde error.
        let value: Value = serde_json::from_slice(&body).map_err(|_| ClientError::InvalidFormat)?;
        let results = value
            .get("results")
            .and_then(Value::as_array)
            .ok_or(ClientError::InvalidFormat)?;
        let results: Vec<String> = results
            .iter()
            .map(|entry| entry.as_str().map(str::to_string))
            .collect::<Option<_>>()
            .ok_or(ClientError::InvalidFormat)?;
        let limited = value
            .get("limited")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(SearchResponse { results, limited })
    }

    /// Fetch surrounding context for a matched line.
    pub async fn file_content(
        &self,
        file_path: &str,
        line_number: u64,
        base_path: &str,
    ) -> Result<FileContext, ClientError> {
        let response = self
            .http
            .get(format!("{}/file-content", self.base_url))
            .query(&[("file_path", file_path), ("base_path", base_path)])
            .query(&[("line_number", line_number), ("context_lines", CONTEXT_LINES)])
            .send()
            .await?;
        let body = Self::check_status(response).await?;
        serde_json::from_slice(&body).map_err(|_| ClientError::InvalidFormat)
    }

    /// Fetch the recursive caller tree for a function.
    pub async fn call_hierarchy(
        &self,
        function_name: &str,
        base_path: &str,
    ) -> Result<CallHierarchy, ClientError> {
        let response = self
            .http
            .get(format!("{}/call-hierarchy", self.base_url))
            .query(&[("function_name", function_name), ("base_path", base_path)])
            .query(&[("max_depth", MAX_HIERARCHY_DEPTH)])
            .send()
            .await?;
        let body = Self::check_status(response).await?;
        serde_json::from_slice(&body).map_err(|_| ClientError::InvalidFormat)
    }

    /// On non-2xx, surface the server-provided `error` message when the
    /// body carries one, otherwise a generic status error.
    async fn check_status(response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status.is_success() {
            return Ok(body);
        }
        if let Ok(value) = serde_json::from_slice::<Value>(&body) {
            if let Some(message) = value.get("error").and_then(Value::as_str) {
                return Err(ClientError::Server(message.to_string()));
            }
        }
        Err(ClientError::Status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SearchClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_error_display_matches_ui_strings() {
        assert_eq!(
            ClientError::Server("pattern is required".into()).to_string(),
            "pattern is required"
        );
        assert_eq!(ClientError::Status(500).to_string(), "Server error: 500");
        assert_eq!(
            ClientError::InvalidFormat.to_string(),
            "Invalid response format from server"
        );
    }
}
