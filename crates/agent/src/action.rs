//! Response parsing: raw LLM text → [`Action`].
//!
//! The model is asked for exactly one JSON object. Extraction is tolerant of
//! surrounding prose (the span from the first `{` to the last `}` is parsed)
//! and classification is tolerant of a few common shape mistakes.

use scoutclaw_core::tool::{ToolArgs, ToolRegistry};
use serde_json::Value;

/// What the model asked the loop to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Stop and answer with this text.
    Final { text: String },
    /// Call a registered (or unknown) tool.
    ToolCall { tool: String, args: ToolArgs },
    /// Valid JSON object that matches no known shape.
    Unrecognized { raw: Value },
}

/// Extract one JSON object from free text.
///
/// Text between the first `{` and the last `}` must parse on its own, so two
/// objects in one reply, or a stray `}` in trailing prose, yield `None`.
pub fn extract_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Normalize a parsed object into an [`Action`].
///
/// Precedence: `final`, then `tool` (non-string names are rendered as JSON
/// text and dispatched like any other unknown name), then a lone key naming
/// a registered tool, else unrecognized.
pub fn classify(object: serde_json::Map<String, Value>, registry: &ToolRegistry) -> Action {
    if let Some(value) = object.get("final") {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Action::Final { text };
    }

    if let Some(tool) = object.get("tool") {
        let tool = match tool {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let args = match object.get("args") {
            Some(Value::Object(args)) => args.clone(),
            _ => ToolArgs::new(),
        };
        return Action::ToolCall { tool, args };
    }

    if object.len() == 1 {
        if let Some((name, value)) = object.iter().next() {
            if registry.contains(name) {
                let args = match value {
                    Value::Object(args) => args.clone(),
                    _ => ToolArgs::new(),
                };
                return Action::ToolCall {
                    tool: name.clone(),
                    args,
                };
            }
        }
    }

    Action::Unrecognized {
        raw: Value::Object(object),
    }
}

/// Extract and classify in one go. `None` means the text held no usable
/// JSON object; `{}` counts as none.
pub fn parse_action(text: &str, registry: &ToolRegistry) -> Option<Action> {
    extract_json_object(text)
        .filter(|object| !object.is_empty())
        .map(|object| classify(object, registry))
}
