//! `scoutclaw run`: answer a single task.

use scoutclaw_agent::AgentLoop;
use scoutclaw_memory::{KeyValueStore, VectorIndex};
use std::sync::Arc;

pub struct RunArgs {
    pub task: String,
    pub max_steps: Option<usize>,
    pub no_preflight: bool,
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let task = args.task.trim();
    if task.is_empty() {
        return Err("--task must not be empty".into());
    }

    let providers = scoutclaw_providers::build_from_config(&config)?;
    let provider = providers
        .default()
        .ok_or("No default provider configured")?;

    let tools = Arc::new(scoutclaw_tools::default_registry(
        provider.clone(),
        Arc::new(KeyValueStore::new()),
        Arc::new(VectorIndex::new()),
        &config,
    ));

    let mut agent = AgentLoop::from_config(provider, tools, &config);
    if let Some(max_steps) = args.max_steps {
        agent = agent.with_max_steps(max_steps);
    }
    if args.no_preflight {
        agent = agent.with_auto_preflight(false);
    }

    let outcome = agent.run(task).await;
    tracing::info!(
        termination = outcome.termination.as_str(),
        steps = outcome.steps,
        llm_calls = outcome.llm_calls,
        "Run finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.answer);
    }

    Ok(())
}
