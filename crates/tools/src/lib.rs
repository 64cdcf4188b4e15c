//! Built-in tool implementations for ScoutClaw.
//!
//! Tools give the agent the ability to interact with the world: search the
//! web, read and index pages, check whether a topic is new, remember values
//! and do arithmetic.

pub mod calculator;
mod embedding;
pub mod memory_tools;
pub mod novelty;
pub mod rag;
pub mod read_url;
pub mod web_search;

use scoutclaw_config::AppConfig;
use scoutclaw_core::provider::Provider;
use scoutclaw_core::tool::ToolRegistry;
use scoutclaw_memory::{KeyValueStore, VectorIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Create the default tool registry with all built-in tools.
///
/// `provider` backs the embeddings of `novelty_check` and the RAG tools;
/// `store` is shared by the memory tools and `index` by the RAG tools.
/// Tools listed in `agent.fast_exit_tools` are tagged fast-exit.
pub fn default_registry(
    provider: Arc<dyn Provider>,
    store: Arc<KeyValueStore>,
    index: Arc<VectorIndex>,
    config: &AppConfig,
) -> ToolRegistry {
    let timeout = Duration::from_secs(config.tools.http_timeout_secs);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(calculator::CalculatorTool));
    registry.register(Box::new(memory_tools::MemorySetTool::new(store.clone())));
    registry.register(Box::new(memory_tools::MemoryGetTool::new(store)));
    registry.register(Box::new(web_search::WebSearchTool::new(timeout)));
    registry.register(Box::new(read_url::ReadUrlCleanTool::new(timeout)));
    registry.register(Box::new(novelty::NoveltyCheckTool::new(
        provider.clone(),
        config.tools.embedding_model.clone(),
        f64::from(config.tools.novelty_threshold),
    )));
    registry.register(Box::new(rag::RagUpsertUrlTool::new(
        provider.clone(),
        config.tools.embedding_model.clone(),
        index.clone(),
        timeout,
    )));
    registry.register(Box::new(rag::RagSearchTool::new(
        provider,
        config.tools.embedding_model.clone(),
        index,
    )));

    for name in &config.agent.fast_exit_tools {
        registry.mark_fast_exit(name);
    }

    debug!(tools = registry.len(), "Default tool registry built");
    registry
}
