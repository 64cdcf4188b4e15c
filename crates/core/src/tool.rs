//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools give the agent the ability to act in the world: search the web,
//! read pages, remember values, check topic novelty, do arithmetic.
//!
//! Every call goes through [`ToolRegistry::call`], which always yields a
//! [`ToolResult`] envelope. Unknown names, tool errors and tool panics all
//! become failing envelopes; nothing propagates past the registry.

use crate::error::ToolError;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// Free-form keyword arguments as emitted by the LLM.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// The uniform `{ok, data, error}` envelope every tool call returns.
///
/// `ok == true` implies an empty `error`; `ok == false` carries a non-empty,
/// human-readable `error` and normally a null `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: String,
}

impl ToolResult {
    /// A successful result carrying `data`.
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            ok: true,
            data,
            error: String::new(),
        }
    }

    /// A failed result. An empty message is replaced so the envelope stays readable.
    pub fn failure(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".into();
        }
        Self {
            ok: false,
            data: serde_json::Value::Null,
            error,
        }
    }
}

/// The core Tool trait.
///
/// Each tool (calculator, web_search, memory_set, ...) implements this trait.
/// Tools validate their own arguments and report bad input as
/// [`ToolError::InvalidArguments`] or a failing [`ToolResult`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search").
    fn name(&self) -> &str;

    /// A one-line description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// Example argument shape rendered into the catalog.
    fn example_args(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError>;

    /// Final answer text used when this tool is registered as fast-exit.
    fn fast_exit_answer(&self, _args: &ToolArgs, result: &ToolResult) -> String {
        display_value(&result.data)
    }
}

/// Render a JSON value for display: strings verbatim, null as empty, the rest as JSON.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fetch a required, non-empty string argument.
pub fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ToolError::InvalidArguments(format!("missing '{key}'"))),
    }
}

/// Fetch an optional unsigned integer argument, accepting numeric strings.
pub fn optional_u64(args: &ToolArgs, key: &str, default: u64) -> u64 {
    match args.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(default),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Render the tool catalog into the system prompt
/// 2. Execute tool calls by name
/// 3. Decide whether a successful call ends the run (fast-exit tools)
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
    fast_exit: BTreeSet<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            fast_exit: BTreeSet::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Register a tool whose successful result ends the run directly.
    pub fn register_fast_exit(&mut self, tool: Box<dyn Tool>) {
        self.fast_exit.insert(tool.name().to_string());
        self.register(tool);
    }

    /// Tag an already registered tool as fast-exit. Returns `false` for unknown names.
    pub fn mark_fast_exit(&mut self, name: &str) -> bool {
        if !self.tools.contains_key(name) {
            warn!(tool = %name, "Cannot mark unknown tool as fast-exit");
            return false;
        }
        self.fast_exit.insert(name.to_string());
        true
    }

    /// Whether `name` is tagged fast-exit.
    pub fn is_fast_exit(&self, name: &str) -> bool {
        self.fast_exit.contains(name)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the catalog for prompt injection, one line per tool, sorted by name.
    pub fn catalog_text(&self) -> String {
        self.tools
            .values()
            .map(|t| format!("- {}: {} Args: {}", t.name(), t.description(), t.example_args()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Execute a tool by name. Never fails: every outcome is an envelope.
    pub async fn call(&self, name: &str, args: &ToolArgs) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            debug!(tool = %name, "Unknown tool requested");
            return ToolResult::failure(ToolError::NotFound(name.to_string()).to_string());
        };

        match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => ToolResult::failure(format!("tool error: {e}")),
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                warn!(tool = %name, panic = %msg, "Tool panicked");
                ToolResult::failure(format!("tool panicked: {msg}"))
            }
        }
    }

    /// The fast-exit answer for a call, if the tool is fast-exit and succeeded.
    pub fn fast_exit_answer(&self, name: &str, args: &ToolArgs, result: &ToolResult) -> Option<String> {
        if !result.ok || !self.is_fast_exit(name) {
            return None;
        }
        self.get(name).map(|t| t.fast_exit_answer(args, result))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input."
        }
        fn example_args(&self) -> serde_json::Value {
            json!({"text": "..."})
        }
        async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
            let text = required_str(args, "text")?;
            Ok(ToolResult::success(json!(text)))
        }
    }

    struct PanicTool;

    #[async_trait]
    impl Tool for PanicTool {
        fn name(&self) -> &str {
            "boom"
        }
        fn description(&self) -> &str {
            "Always panics."
        }
        fn example_args(&self) -> serde_json::Value {
            json!({})
        }
        async fn execute(&self, _args: &ToolArgs) -> Result<ToolResult, ToolError> {
            panic!("kaboom")
        }
    }

    fn args(value: serde_json::Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn envelope_invariants() {
        let ok = ToolResult::success(json!(23));
        assert!(ok.ok);
        assert!(ok.error.is_empty());

        let failed = ToolResult::failure("");
        assert!(!failed.ok);
        assert!(!failed.error.is_empty());
        assert!(failed.data.is_null());
    }

    #[test]
    fn envelope_serializes_all_fields() {
        let json = serde_json::to_value(ToolResult::failure("nope")).unwrap();
        assert_eq!(json, json!({"ok": false, "data": null, "error": "nope"}));
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn catalog_is_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(PanicTool));
        registry.register(Box::new(EchoTool));
        let catalog = registry.catalog_text();
        let lines: Vec<&str> = catalog.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- boom:"));
        assert!(lines[1].starts_with("- echo: Echoes back the input. Args: {\"text\":\"...\"}"));
    }

    #[tokio::test]
    async fn call_executes_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let result = registry.call("echo", &args(json!({"text": "hello world"}))).await;
        assert!(result.ok);
        assert_eq!(result.data, json!("hello world"));
    }

    #[tokio::test]
    async fn call_unknown_tool_fails_cleanly() {
        let registry = ToolRegistry::new();
        let result = registry.call("nonexistent", &ToolArgs::new()).await;
        assert!(!result.ok);
        assert_eq!(result.error, "unknown tool: nonexistent");
    }

    #[tokio::test]
    async fn tool_error_becomes_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let result = registry.call("echo", &ToolArgs::new()).await;
        assert!(!result.ok);
        assert!(result.error.contains("missing 'text'"));
    }

    #[tokio::test]
    async fn tool_panic_is_contained() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(PanicTool));
        let result = registry.call("boom", &ToolArgs::new()).await;
        assert!(!result.ok);
        assert!(result.error.contains("kaboom"));
    }

    #[test]
    fn fast_exit_tagging() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(!registry.is_fast_exit("echo"));
        assert!(registry.mark_fast_exit("echo"));
        assert!(registry.is_fast_exit("echo"));
        assert!(!registry.mark_fast_exit("missing"));

        let ok = ToolResult::success(json!("hi"));
        let answer = registry.fast_exit_answer("echo", &ToolArgs::new(), &ok);
        assert_eq!(answer.as_deref(), Some("hi"));

        let failed = ToolResult::failure("x");
        assert!(registry.fast_exit_answer("echo", &ToolArgs::new(), &failed).is_none());
    }

    #[test]
    fn optional_u64_accepts_strings() {
        let a = args(json!({"k": "7", "n": 3, "bad": "x"}));
        assert_eq!(optional_u64(&a, "k", 5), 7);
        assert_eq!(optional_u64(&a, "n", 5), 3);
        assert_eq!(optional_u64(&a, "bad", 5), 5);
        assert_eq!(optional_u64(&a, "missing", 5), 5);
    }
}
