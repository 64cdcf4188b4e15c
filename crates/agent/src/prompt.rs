//! Prompt assembly: a pure function of task, observations and step.
//!
//! Every step sends exactly two messages:
//!
//! 1. **System**: the behavioural contract plus the tool catalog
//! 2. **User**: the task, an urgency note near the step limit, and every
//!    observation so far (each envelope capped at [`MAX_OBSERVATION_CHARS`])
//!
//! Identical inputs always produce identical messages.

use crate::loop_runner::Observation;
use scoutclaw_core::message::Message;

/// Longest serialized envelope shown per observation.
pub const MAX_OBSERVATION_CHARS: usize = 1200;

const SYSTEM_TEMPLATE: &str = r#"You are a research agent that solves tasks, using tools when needed.
ALWAYS reply with a single JSON object and nothing else: no comments, no extra text.
Valid formats:
- To use a tool: {"tool": "<name>", "args": {...}}
- To finish with an answer for the user: {"final": "<text>"}

Available tools:
{tool_catalog}

Rules:
1. If a tool fails twice, stop using it and finish with an explanation.
2. Finish as soon as you have enough information.
3. Never use alternative shapes such as {"web_search": {...}}.
Do not explain the JSON, just return it."#;

/// Sent after a reply that held no parseable JSON object.
pub const JSON_REMINDER: &str =
    r#"Reminder: reply with exactly one valid JSON object. If you can finish, use {"final": "..."}."#;

/// Appended for the single preflight answer call.
pub const PREFLIGHT_INSTRUCTION: &str = r#"Answer the task now using only the observations above. Reply with {"final": "..."} containing concise bullet points followed by a "Sources:" list of the URLs you used."#;

/// Builds the per-step messages for one run.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system: String,
}

impl PromptAssembler {
    /// `catalog` is the registry's rendered catalog text.
    pub fn new(catalog: &str) -> Self {
        Self {
            system: SYSTEM_TEMPLATE.replace("{tool_catalog}", catalog),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    /// Messages for step `step` (0-based) of `max_steps`.
    pub fn messages(
        &self,
        task: &str,
        observations: &[Observation],
        step: usize,
        max_steps: usize,
    ) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(user_content(task, observations, step, max_steps)),
        ]
    }
}

fn user_content(task: &str, observations: &[Observation], step: usize, max_steps: usize) -> String {
    let mut content = format!("Task: {task}\n");
    if let Some(note) = urgency_note(step, max_steps) {
        content.push('\n');
        content.push_str(&note);
        content.push('\n');
    }

    content.push_str("\nPrevious observations:\n");
    if observations.is_empty() {
        content.push_str("- (none)\n");
    }
    for (i, obs) in observations.iter().enumerate() {
        let envelope = serde_json::to_string(&obs.result).unwrap_or_default();
        content.push_str(&format!(
            "- obs#{} from {}: {}\n",
            i + 1,
            obs.tool,
            cap_chars(&envelope, MAX_OBSERVATION_CHARS)
        ));
    }
    content
}

/// The step counter warning, if the run is close to its limit.
pub fn urgency_note(step: usize, max_steps: usize) -> Option<String> {
    let shown = step + 1;
    if step + 2 >= max_steps {
        Some(format!(
            "URGENT: step {shown}/{max_steps}. Finish NOW with {{\"final\": \"...\"}}."
        ))
    } else if step + 3 >= max_steps {
        Some(format!(
            "Notice: step {shown}/{max_steps}. If you have the information, consider finishing soon."
        ))
    } else {
        None
    }
}

/// Keep the first `max` characters, marking the cut with `...`.
fn cap_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
