//! Preflight shortcut: search, read a few pages, answer in one LLM call.
//!
//! Factual and trend questions rarely need the full step loop. When the
//! task looks factual and both `web_search` and `read_url_clean` exist, the
//! loop first tries this fixed pipeline. Any miss (no results, no final
//! answer, an LLM error) falls through to the step loop without a trace in
//! the answer.

use crate::action::{Action, parse_action};
use crate::heuristics::looks_factual;
use crate::loop_runner::{AgentLoop, Observation, RunOutcome, Termination};
use crate::prompt::{PREFLIGHT_INSTRUCTION, PromptAssembler};
use scoutclaw_core::message::Message;
use scoutclaw_core::tool::ToolArgs;
use tracing::{debug, info};

pub const SEARCH_TOOL: &str = "web_search";
pub const READ_TOOL: &str = "read_url_clean";

/// Characters requested per page read.
const READ_MAX_CHARS: u64 = 3000;

impl AgentLoop {
    /// Whether the shortcut should be attempted for `task`.
    pub fn preflight_applies(&self, task: &str) -> bool {
        self.auto_preflight
            && self.tools.contains(SEARCH_TOOL)
            && self.tools.contains(READ_TOOL)
            && looks_factual(task, &self.tools.names())
    }

    /// Run the shortcut. `None` means fall through to the step loop.
    pub(crate) async fn try_preflight(
        &self,
        task: &str,
        llm_calls: &mut usize,
    ) -> Option<RunOutcome> {
        info!(task_len = task.len(), "Preflight shortcut");

        let mut search_args = ToolArgs::new();
        search_args.insert("query".into(), task.into());
        search_args.insert("k".into(), self.preflight_search_k.into());
        let search = self.tools.call(SEARCH_TOOL, &search_args).await;

        let urls = result_urls(&search.data, self.preflight_max_reads);
        if !search.ok || urls.is_empty() {
            debug!(ok = search.ok, error = %search.error, "Preflight search gave nothing to read");
            return None;
        }

        let mut observations = vec![Observation {
            tool: SEARCH_TOOL.into(),
            args: search_args,
            result: search,
        }];

        for url in urls {
            let mut read_args = ToolArgs::new();
            read_args.insert("url".into(), url.clone().into());
            read_args.insert("max_chars".into(), READ_MAX_CHARS.into());
            let page = self.tools.call(READ_TOOL, &read_args).await;
            if !page.ok {
                debug!(url = %url, error = %page.error, "Preflight read failed, skipping");
                continue;
            }
            observations.push(Observation {
                tool: READ_TOOL.into(),
                args: read_args,
                result: page,
            });
        }

        let assembler = PromptAssembler::new(&self.tools.catalog_text());
        let mut messages = assembler.messages(task, &observations, 0, self.max_steps);
        messages.push(Message::user(PREFLIGHT_INSTRUCTION));

        let raw = self.complete(messages, llm_calls).await.ok()?;
        match parse_action(&raw, &self.tools) {
            Some(Action::Final { text }) => Some(self.finish(
                text,
                Termination::Preflight,
                0,
                *llm_calls,
                observations,
            )),
            _ => {
                debug!("Preflight reply was not a final answer");
                None
            }
        }
    }
}

/// Distinct non-empty `url`s from a `{results: [...]}` payload, in order.
fn result_urls(data: &serde_json::Value, limit: usize) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let Some(results) = data.get("results").and_then(|r| r.as_array()) else {
        return urls;
    };
    for url in results
        .iter()
        .filter_map(|r| r.get("url").and_then(|u| u.as_str()))
        .map(str::trim)
        .filter(|u| !u.is_empty())
    {
        if urls.len() >= limit {
            break;
        }
        if !urls.iter().any(|seen| seen == url) {
            urls.push(url.to_string());
        }
    }
    urls
}
