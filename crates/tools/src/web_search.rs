//! Web search tool backed by the DuckDuckGo Instant Answer API.
//!
//! The API needs no key. It returns an abstract for well-known entities plus
//! a tree of related topics; both are flattened into `{title, url, snippet}`
//! results. An empty result list is still a success.

use async_trait::async_trait;
use scoutclaw_core::error::ToolError;
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult, optional_u64, required_str};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";
const DEFAULT_K: u64 = 5;
const MAX_K: u64 = 20;

pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl WebSearchTool {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scoutclaw/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout,
        }
    }

    /// Point the tool at a different Instant-Answer-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn failed(reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: reason.into(),
        }
    }

    fn request_failed(&self, e: reqwest::Error) -> ToolError {
        if e.is_timeout() {
            ToolError::Timeout {
                tool_name: "web_search".into(),
                timeout_secs: self.timeout.as_secs().max(1),
            }
        } else {
            Self::failed(e.to_string())
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns results with title, url and snippet."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"query": "...", "k": DEFAULT_K})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let query = required_str(args, "query")?;
        let k = optional_u64(args, "k", DEFAULT_K).clamp(1, MAX_K) as usize;

        debug!(query = %query, k, "web_search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        if !response.status().is_success() {
            return Ok(ToolResult::failure(format!(
                "search failed with status {}",
                response.status().as_u16()
            )));
        }

        // DuckDuckGo answers with `application/x-javascript`, so parse the text.
        let body = response
            .text()
            .await
            .map_err(|e| self.request_failed(e))?;
        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Self::failed(format!("unreadable search response: {e}")))?;

        let results = parse_instant_answer(&payload, k);
        debug!(count = results.len(), "web_search results");
        Ok(ToolResult::success(serde_json::json!({ "results": results })))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Flatten an Instant Answer payload into at most `k` results.
pub fn parse_instant_answer(payload: &serde_json::Value, k: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    let abstract_url = str_field(payload, "AbstractURL");
    let abstract_text = str_field(payload, "AbstractText");
    if !abstract_url.is_empty() && !abstract_text.is_empty() {
        let heading = str_field(payload, "Heading");
        results.push(SearchResult {
            title: if heading.is_empty() { abstract_url.clone() } else { heading },
            url: abstract_url,
            snippet: abstract_text,
        });
    }

    for source in ["Results", "RelatedTopics"] {
        if let Some(items) = payload.get(source).and_then(|v| v.as_array()) {
            collect_topics(items, &mut results, k);
        }
    }

    results.truncate(k);
    results
}

fn collect_topics(items: &[serde_json::Value], out: &mut Vec<SearchResult>, k: usize) {
    for item in items {
        if out.len() >= k {
            return;
        }
        // Category groups nest their entries under "Topics".
        if let Some(nested) = item.get("Topics").and_then(|v| v.as_array()) {
            collect_topics(nested, out, k);
            continue;
        }

        let url = str_field(item, "FirstURL");
        let text = str_field(item, "Text");
        if url.is_empty() || text.is_empty() || out.iter().any(|r| r.url == url) {
            continue;
        }
        let title = text
            .split_once(" - ")
            .map(|(head, _)| head.to_string())
            .unwrap_or_else(|| text.clone());
        out.push(SearchResult {
            title,
            url,
            snippet: text,
        });
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "Heading": "Rust (programming language)",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "AbstractText": "Rust is a general-purpose programming language.",
            "Results": [
                {"FirstURL": "https://www.rust-lang.org/", "Text": "Official site"}
            ],
            "RelatedTopics": [
                {"FirstURL": "https://duckduckgo.com/Cargo", "Text": "Cargo - Rust package manager"},
                {
                    "Name": "Tooling",
                    "Topics": [
                        {"FirstURL": "https://duckduckgo.com/Clippy", "Text": "Clippy - A Rust linter"},
                        {"FirstURL": "https://duckduckgo.com/Cargo", "Text": "Cargo - duplicate"}
                    ]
                },
                {"Text": "no url here"}
            ]
        })
    }

    #[test]
    fn abstract_comes_first() {
        let results = parse_instant_answer(&sample(), 10);
        assert_eq!(results[0].title, "Rust (programming language)");
        assert!(results[0].snippet.starts_with("Rust is"));
    }

    #[test]
    fn nested_topics_are_flattened_and_deduplicated() {
        let results = parse_instant_answer(&sample(), 10);
        let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                "https://www.rust-lang.org/",
                "https://duckduckgo.com/Cargo",
                "https://duckduckgo.com/Clippy",
            ]
        );
        assert_eq!(results[2].title, "Cargo");
        assert_eq!(results[2].snippet, "Cargo - Rust package manager");
    }

    #[test]
    fn k_limits_results() {
        assert_eq!(parse_instant_answer(&sample(), 2).len(), 2);
    }

    #[test]
    fn empty_payload_yields_no_results() {
        assert!(parse_instant_answer(&json!({}), 5).is_empty());
        assert!(parse_instant_answer(&json!({"AbstractText": "", "RelatedTopics": []}), 5).is_empty());
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let tool = WebSearchTool::new(Duration::from_secs(1));
        let err = tool.execute(&ToolArgs::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_execution_failure() {
        let tool = WebSearchTool::new(Duration::from_millis(500))
            .with_endpoint("http://127.0.0.1:9/");
        let args = json!({"query": "rust"}).as_object().cloned().unwrap();
        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn silent_endpoint_times_out() {
        // Connections queue in the backlog but nothing ever answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let tool = WebSearchTool::new(Duration::from_millis(200))
            .with_endpoint(format!("http://{addr}/"));
        let args = json!({"query": "rust"}).as_object().cloned().unwrap();
        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Timeout { ref tool_name, timeout_secs: 1 } if tool_name == "web_search"
        ));
        drop(listener);
    }
}
