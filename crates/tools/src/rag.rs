//! Retrieval over pages the agent has indexed.
//!
//! `rag_upsert_url` downloads a page, extracts its text the same way as
//! `read_url_clean`, embeds the first `max_chars` characters and stores them
//! in the shared [`VectorIndex`] under the URL. `rag_search` embeds a query
//! and returns the closest indexed pages.

use crate::embedding::embed_one;
use crate::read_url::{fetch_clean_text, http_client, http_url_arg, truncate_chars};
use async_trait::async_trait;
use scoutclaw_core::error::ToolError;
use scoutclaw_core::provider::Provider;
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult, optional_u64, required_str};
use scoutclaw_memory::VectorIndex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_MAX_CHARS: u64 = 6000;
const DEFAULT_K: u64 = 3;
const MAX_K: u64 = 20;
const EXCERPT_CHARS: usize = 500;

pub struct RagUpsertUrlTool {
    provider: Arc<dyn Provider>,
    model: String,
    index: Arc<VectorIndex>,
    client: reqwest::Client,
}

impl RagUpsertUrlTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        index: Arc<VectorIndex>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            index,
            client: http_client(timeout),
        }
    }
}

#[async_trait]
impl Tool for RagUpsertUrlTool {
    fn name(&self) -> &str {
        "rag_upsert_url"
    }

    fn description(&self) -> &str {
        "Index the text of a URL so rag_search can find it later."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"url": "https://...", "max_chars": DEFAULT_MAX_CHARS})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let url = http_url_arg(args)?;
        let max_chars = optional_u64(args, "max_chars", DEFAULT_MAX_CHARS) as usize;

        let text = match fetch_clean_text(&self.client, url).await {
            Ok(text) => truncate_chars(&text, max_chars),
            Err(failure) => return Ok(failure),
        };
        let embedding = match embed_one(self.provider.as_ref(), &self.model, &text).await? {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };

        let chars = text.chars().count();
        let replaced = self.index.upsert(url, text, embedding);
        debug!(url = %url, chars, replaced, documents = self.index.len(), "rag_upsert_url");

        Ok(ToolResult::success(serde_json::json!({
            "upserted": url,
            "chars": chars,
            "replaced": replaced,
        })))
    }
}

pub struct RagSearchTool {
    provider: Arc<dyn Provider>,
    model: String,
    index: Arc<VectorIndex>,
}

impl RagSearchTool {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, index: Arc<VectorIndex>) -> Self {
        Self {
            provider,
            model: model.into(),
            index,
        }
    }
}

#[async_trait]
impl Tool for RagSearchTool {
    fn name(&self) -> &str {
        "rag_search"
    }

    fn description(&self) -> &str {
        "Search the indexed pages and return the top-k matching excerpts."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"query": "...", "k": DEFAULT_K})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let query = required_str(args, "query")?;
        let k = optional_u64(args, "k", DEFAULT_K).clamp(1, MAX_K) as usize;

        if self.index.is_empty() {
            debug!(query = %query, "rag_search on empty index");
            return Ok(ToolResult::success(serde_json::json!({ "matches": [] })));
        }

        let embedding = match embed_one(self.provider.as_ref(), &self.model, query).await? {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };
        let matches = self.index.search(&embedding, k, EXCERPT_CHARS);
        debug!(query = %query, k, hits = matches.len(), "rag_search");

        Ok(ToolResult::success(serde_json::json!({ "matches": matches })))
    }
}
