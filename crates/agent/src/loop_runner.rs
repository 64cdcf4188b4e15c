//! The agent control loop.
//!
//! A bounded step machine: each step assembles a prompt, asks the LLM for a
//! JSON action, and either finishes or runs one tool and records the result
//! as an observation. Besides the final answer the loop stops early on:
//!
//! - a reply that still holds no JSON after one corrective retry
//! - a successful call to a fast-exit tool
//! - a tool failure caused by missing setup (SDK, credentials)
//! - [`CIRCUIT_BREAKER_THRESHOLD`] consecutive failed observations
//! - a failed LLM call
//!
//! [`AgentLoop::run`] never fails: every outcome, including errors, is
//! returned as answer text inside a [`RunOutcome`].

use crate::action::{Action, parse_action};
use crate::heuristics::is_unrecoverable_failure;
use crate::prompt::{JSON_REMINDER, PromptAssembler};
use scoutclaw_config::AppConfig;
use scoutclaw_core::error::ProviderError;
use scoutclaw_core::message::Message;
use scoutclaw_core::provider::{Provider, ProviderRequest};
use scoutclaw_core::tool::{ToolArgs, ToolRegistry, ToolResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consecutive failed observations that stop the run.
pub const CIRCUIT_BREAKER_THRESHOLD: usize = 3;

/// Answer text when no step produced a final answer.
pub const BUDGET_EXHAUSTED: &str = "[agent] Step budget exhausted without a final answer.";

/// Characters of an unparseable reply quoted in the parse-failure answer.
const RAW_EXCERPT_CHARS: usize = 500;

/// Tool name recorded for malformed actions.
pub const AGENT_PSEUDO_TOOL: &str = "agent";

/// One tool call and its result, in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub tool: String,
    pub args: ToolArgs,
    pub result: ToolResult,
}

impl Observation {
    /// Synthetic failure recorded when the model emitted an unknown action shape.
    pub fn unrecognized(raw: &serde_json::Value) -> Self {
        Self {
            tool: AGENT_PSEUDO_TOOL.into(),
            args: ToolArgs::new(),
            result: ToolResult::failure(format!(
                "unrecognized action {raw}; reply with {{\"tool\": ..., \"args\": {{...}}}} or {{\"final\": ...}}"
            )),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model returned `{"final": ...}`.
    Final,
    /// A fast-exit tool succeeded.
    FastExit,
    /// The search-and-read shortcut produced the answer.
    Preflight,
    /// No JSON object even after the corrective retry.
    ParseFailure,
    /// A tool reported missing setup.
    DependencyFailure,
    /// Too many consecutive failures.
    CircuitBreaker,
    /// Every step was used.
    BudgetExhausted,
    /// The LLM call itself failed.
    ProviderFailure,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Final => "final",
            Termination::FastExit => "fast_exit",
            Termination::Preflight => "preflight",
            Termination::ParseFailure => "parse_failure",
            Termination::DependencyFailure => "dependency_failure",
            Termination::CircuitBreaker => "circuit_breaker",
            Termination::BudgetExhausted => "budget_exhausted",
            Termination::ProviderFailure => "provider_failure",
        }
    }
}

/// The result of one [`AgentLoop::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// The answer text (also carries diagnostics for abnormal endings).
    pub answer: String,
    pub termination: Termination,
    /// Steps of the general loop that were started.
    pub steps: usize,
    /// LLM calls made, including retries and the preflight call.
    pub llm_calls: usize,
    /// Observations of whichever phase produced the answer.
    pub observations: Vec<Observation>,
}

/// The agent loop: owns its collaborators and run settings, nothing else.
pub struct AgentLoop {
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: Option<u32>,
    pub(crate) max_steps: usize,
    pub(crate) auto_preflight: bool,
    pub(crate) preflight_search_k: u32,
    pub(crate) preflight_max_reads: usize,
}

impl AgentLoop {
    /// Create a loop with default settings (5 steps, preflight on).
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            max_steps: 5,
            auto_preflight: true,
            preflight_search_k: 5,
            preflight_max_reads: 3,
        }
    }

    /// Create a loop with every setting taken from config.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, tools, config.default_model.clone())
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_steps(config.agent.max_steps)
            .with_auto_preflight(config.agent.auto_preflight)
            .with_preflight_limits(config.agent.preflight_search_k, config.agent.preflight_max_reads)
    }

    /// Set the step budget. Values below 1 are raised to 1.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_auto_preflight(mut self, enabled: bool) -> Self {
        self.auto_preflight = enabled;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Search result count and page reads used by the preflight shortcut.
    pub fn with_preflight_limits(mut self, search_k: u32, max_reads: usize) -> Self {
        self.preflight_search_k = search_k.max(1);
        self.preflight_max_reads = max_reads;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one task to completion.
    pub async fn run(&self, task: &str) -> RunOutcome {
        let mut llm_calls = 0usize;

        info!(
            model = %self.model,
            max_steps = self.max_steps,
            tools = self.tools.len(),
            "Agent run starting"
        );

        if self.preflight_applies(task) {
            if let Some(outcome) = self.try_preflight(task, &mut llm_calls).await {
                return outcome;
            }
            debug!("Preflight fell through, entering the step loop");
        }

        let assembler = PromptAssembler::new(&self.tools.catalog_text());
        let mut observations: Vec<Observation> = Vec::new();

        for step in 0..self.max_steps {
            let steps = step + 1;
            debug!(step = steps, observations = observations.len(), "Agent step");

            let mut messages = assembler.messages(task, &observations, step, self.max_steps);
            let raw = match self.complete(messages.clone(), &mut llm_calls).await {
                Ok(text) => text,
                Err(e) => {
                    return self.finish(
                        format!("[agent] LLM call failed: {e}"),
                        Termination::ProviderFailure,
                        steps,
                        llm_calls,
                        observations,
                    );
                }
            };

            let action = match parse_action(&raw, &self.tools) {
                Some(action) => action,
                None => {
                    warn!(step = steps, "Reply held no JSON object, retrying once");
                    messages.push(Message::user(JSON_REMINDER));
                    let retry = match self.complete(messages, &mut llm_calls).await {
                        Ok(text) => text,
                        Err(e) => {
                            return self.finish(
                                format!("[agent] LLM call failed: {e}"),
                                Termination::ProviderFailure,
                                steps,
                                llm_calls,
                                observations,
                            );
                        }
                    };
                    match parse_action(&retry, &self.tools) {
                        Some(action) => action,
                        None => {
                            let excerpt: String = retry.chars().take(RAW_EXCERPT_CHARS).collect();
                            return self.finish(
                                format!("[agent] Could not parse JSON from the model: {excerpt}"),
                                Termination::ParseFailure,
                                steps,
                                llm_calls,
                                observations,
                            );
                        }
                    }
                }
            };

            match action {
                Action::Final { text } => {
                    return self.finish(text, Termination::Final, steps, llm_calls, observations);
                }

                Action::ToolCall { tool, args } => {
                    let result = self.tools.call(&tool, &args).await;
                    info!(step = steps, tool = %tool, ok = result.ok, "Tool executed");

                    if let Some(answer) = self.tools.fast_exit_answer(&tool, &args, &result) {
                        return self.finish(
                            answer,
                            Termination::FastExit,
                            steps,
                            llm_calls,
                            observations,
                        );
                    }

                    let unrecoverable = is_unrecoverable_failure(&result);
                    let error = result.error.clone();
                    observations.push(Observation { tool: tool.clone(), args, result });

                    if unrecoverable {
                        return self.finish(
                            format!(
                                "[agent] Tool '{tool}' cannot run because a dependency is missing: {error}. \
                                 Fix the setup (install the package or configure credentials) and retry."
                            ),
                            Termination::DependencyFailure,
                            steps,
                            llm_calls,
                            observations,
                        );
                    }

                    if trailing_failures(&observations) >= CIRCUIT_BREAKER_THRESHOLD {
                        return self.finish(
                            format!(
                                "[agent] Stopped after {CIRCUIT_BREAKER_THRESHOLD} consecutive failures. \
                                 Last error: {error}"
                            ),
                            Termination::CircuitBreaker,
                            steps,
                            llm_calls,
                            observations,
                        );
                    }
                }

                Action::Unrecognized { raw } => {
                    if steps == self.max_steps {
                        return self.finish(
                            format!("{BUDGET_EXHAUSTED} Last unrecognized action: {raw}"),
                            Termination::BudgetExhausted,
                            steps,
                            llm_calls,
                            observations,
                        );
                    }
                    warn!(step = steps, action = %raw, "Unrecognized action");
                    observations.push(Observation::unrecognized(&raw));
                }
            }
        }

        self.finish(
            BUDGET_EXHAUSTED.into(),
            Termination::BudgetExhausted,
            self.max_steps,
            llm_calls,
            observations,
        )
    }

    /// One LLM call, returning the reply text.
    pub(crate) async fn complete(
        &self,
        messages: Vec<Message>,
        llm_calls: &mut usize,
    ) -> Result<String, ProviderError> {
        *llm_calls += 1;
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self.provider.complete(request).await.map_err(|e| {
            warn!(provider = %self.provider.name(), error = %e, "LLM call failed");
            e
        })?;
        Ok(response.message.content)
    }

    pub(crate) fn finish(
        &self,
        answer: String,
        termination: Termination,
        steps: usize,
        llm_calls: usize,
        observations: Vec<Observation>,
    ) -> RunOutcome {
        info!(
            termination = termination.as_str(),
            steps,
            llm_calls,
            observations = observations.len(),
            "Agent run finished"
        );
        RunOutcome {
            answer,
            termination,
            steps,
            llm_calls,
            observations,
        }
    }
}

/// Number of failed observations at the end of the list.
fn trailing_failures(observations: &[Observation]) -> usize {
    observations
        .iter()
        .rev()
        .take_while(|obs| !obs.result.ok)
        .count()
}
