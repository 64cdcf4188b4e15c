//! The ScoutClaw agent: a bounded, tool-using LLM control loop.
//!
//! Each run follows a **Prompt → Parse → Act → Observe** cycle:
//!
//! 1. **Assemble** the system contract, tool catalog, task and observations
//! 2. **Ask** the LLM for exactly one JSON action
//! 3. **Parse** the reply tolerantly into a final answer or a tool call
//! 4. **Act** through the tool registry and record the observation
//!
//! Factual questions may be answered earlier by the preflight shortcut
//! (search, read, answer). The loop always terminates with answer text.

pub mod action;
pub mod heuristics;
pub mod loop_runner;
pub mod preflight;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use action::{Action, classify, extract_json_object, parse_action};
pub use heuristics::{is_unrecoverable_failure, looks_factual};
pub use loop_runner::{AgentLoop, Observation, RunOutcome, Termination};
pub use prompt::PromptAssembler;
