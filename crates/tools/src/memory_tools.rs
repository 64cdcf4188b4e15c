//! `memory_set` / `memory_get`: read and write the shared key/value store.
//!
//! Both tools are usually registered as fast-exit: a successful write ends
//! the run with `OK: saved <key>`, a read ends it with the stored value.

use async_trait::async_trait;
use scoutclaw_core::error::ToolError;
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult, display_value, required_str};
use scoutclaw_memory::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

pub struct MemorySetTool {
    store: Arc<KeyValueStore>,
}

impl MemorySetTool {
    pub fn new(store: Arc<KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemorySetTool {
    fn name(&self) -> &str {
        "memory_set"
    }

    fn description(&self) -> &str {
        "Store a value under a key in short-term memory."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"key": "favorite_topic", "value": "state space models"})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let key = required_str(args, "key")?;
        let value = args.get("value").cloned().unwrap_or(serde_json::Value::Null);

        debug!(key = %key, "memory_set");
        self.store.set(key, value);
        Ok(ToolResult::success(serde_json::json!({"key": key})))
    }

    fn fast_exit_answer(&self, args: &ToolArgs, result: &ToolResult) -> String {
        let key = result
            .data
            .get("key")
            .or_else(|| args.get("key"))
            .map(display_value)
            .unwrap_or_default();
        format!("OK: saved {key}")
    }
}

pub struct MemoryGetTool {
    store: Arc<KeyValueStore>,
}

impl MemoryGetTool {
    pub fn new(store: Arc<KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for MemoryGetTool {
    fn name(&self) -> &str {
        "memory_get"
    }

    fn description(&self) -> &str {
        "Read the value stored under a key (null when absent)."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"key": "favorite_topic"})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let key = required_str(args, "key")?;
        let value = self.store.get(key).unwrap_or(serde_json::Value::Null);

        debug!(key = %key, found = !value.is_null(), "memory_get");
        Ok(ToolResult::success(serde_json::json!({"value": value})))
    }

    fn fast_exit_answer(&self, _args: &ToolArgs, result: &ToolResult) -> String {
        result.data.get("value").map(display_value).unwrap_or_default()
    }
}
