//! `scoutclaw tools`: print the tool catalog.

use scoutclaw_core::provider::Provider;
use scoutclaw_core::tool::ToolRegistry;
use scoutclaw_memory::{KeyValueStore, VectorIndex};
use scoutclaw_providers::OpenAiCompatProvider;
use std::sync::Arc;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    // Listing never calls the provider, so a missing key is fine here.
    let provider: Arc<dyn Provider> = scoutclaw_providers::build_from_config(&config)
        .ok()
        .and_then(|router| router.default())
        .unwrap_or_else(|| Arc::new(OpenAiCompatProvider::ollama(None)) as Arc<dyn Provider>);

    let registry = scoutclaw_tools::default_registry(
        provider,
        Arc::new(KeyValueStore::new()),
        Arc::new(VectorIndex::new()),
        &config,
    );
    print!("{}", render_catalog(&registry));
    Ok(())
}

fn render_catalog(registry: &ToolRegistry) -> String {
    let mut out = format!("{} tools available:\n", registry.len());
    for name in registry.names() {
        let Some(tool) = registry.get(name) else {
            continue;
        };
        let marker = if registry.is_fast_exit(name) { " [fast-exit]" } else { "" };
        out.push_str(&format!("\n  {name}{marker}\n"));
        out.push_str(&format!("    {}\n", tool.description()));
        out.push_str(&format!("    args: {}\n", tool.example_args()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutclaw_config::AppConfig;

    #[test]
    fn catalog_marks_fast_exit_tools() {
        let mut config = AppConfig::default();
        config.agent.fast_exit_tools = vec!["memory_set".into()];
        let registry = scoutclaw_tools::default_registry(
            Arc::new(OpenAiCompatProvider::ollama(None)),
            Arc::new(KeyValueStore::new()),
            Arc::new(VectorIndex::new()),
            &config,
        );

        let text = render_catalog(&registry);
        assert!(text.starts_with("8 tools available:"));
        assert!(text.contains("  memory_set [fast-exit]\n"));
        assert!(text.contains("  calculator\n"));
        assert!(text.contains("\"expression\""));
    }
}
