//! Text predicates that steer the loop.
//!
//! Both are plain keyword checks over lowercased text, kept separate so
//! they can be tested and tuned on their own.

use scoutclaw_core::tool::ToolResult;

/// English and Spanish interrogative openers.
const QUESTION_OPENERS: &[&str] = &[
    "what", "what's", "whats", "who", "whom", "whose", "when", "where", "why", "how", "which",
    "is", "are", "does", "do", "did", "can", "could", "should", "will", "was", "were", "has",
    "have", "qué", "que", "quién", "quien", "quiénes", "cuándo", "cuando", "dónde", "donde",
    "cómo", "cuál", "cual", "cuáles", "cuánto", "cuánta", "cuántos", "cuántas", "existe", "hay",
];

/// Phrases that ask about recent events or the state of a field.
const TREND_PHRASES: &[&str] = &[
    "latest news",
    "current state",
    "state of the art",
    "what's new",
    "trends",
    "trending",
    "news about",
    "recent developments",
    "últimas noticias",
    "ultimas noticias",
    "tendencias",
    "estado actual",
    "novedades",
    "qué hay de nuevo",
];

/// Error fragments meaning a tool cannot work until someone fixes the setup.
const DEPENDENCY_MARKERS: &[&str] = &[
    "sdk not available",
    "sdk no disponible",
    "no module named",
    "not installed",
    "api key",
    "api_key",
    "missing credentials",
    "credentials not configured",
    "authentication failed",
    "dependency unavailable",
];

/// Whether a task reads like a factual or trend question answerable by a
/// quick search-and-read.
///
/// Tasks that mention a registered tool by name are never factual: the user
/// is steering the agent explicitly.
pub fn looks_factual<S: AsRef<str>>(task: &str, tool_names: &[S]) -> bool {
    let lowered = task.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }

    if tool_names
        .iter()
        .any(|name| !name.as_ref().is_empty() && lowered.contains(&name.as_ref().to_lowercase()))
    {
        return false;
    }

    if lowered.contains('?') || lowered.contains('¿') {
        return true;
    }

    let first_word = lowered
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .next()
        .unwrap_or("");
    let por_que = first_word == "por" && lowered.starts_with("por qu");
    if QUESTION_OPENERS.contains(&first_word) || por_que {
        return true;
    }

    TREND_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Whether a failed tool result points at missing setup (SDK, package,
/// credentials) rather than a transient or argument error.
pub fn is_unrecoverable_failure(result: &ToolResult) -> bool {
    if result.ok {
        return false;
    }
    let error = result.error.to_lowercase();
    DEPENDENCY_MARKERS.iter().any(|marker| error.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOLS: &[&str] = &["web_search", "read_url_clean", "calculator", "memory_set"];

    #[test]
    fn questions_are_factual() {
        assert!(looks_factual("Mamba 2 vs transformers?", TOOLS));
        assert!(looks_factual("What is the capital of France", TOOLS));
        assert!(looks_factual("¿Quién ganó el mundial 2022", TOOLS));
        assert!(looks_factual("cómo funciona RLHF", TOOLS));
        assert!(looks_factual("Por qué sube el precio del oro", TOOLS));
    }

    #[test]
    fn trend_phrases_are_factual() {
        assert!(looks_factual("Give me the latest news on open-weight LLMs", TOOLS));
        assert!(looks_factual("Summarize current state of robotics foundation models", TOOLS));
        assert!(looks_factual("Dame las últimas noticias de IA", TOOLS));
        assert!(looks_factual("tendencias en visión por computador", TOOLS));
    }

    #[test]
    fn imperative_tasks_are_not_factual() {
        assert!(!looks_factual("Compute 3*7+2", TOOLS));
        assert!(!looks_factual("Remember that my favorite color is blue", TOOLS));
        assert!(!looks_factual("", TOOLS));
        // "is" must be a whole first word.
        assert!(!looks_factual("Island hopping itinerary for Greece", TOOLS));
    }

    #[test]
    fn naming_a_tool_disables_preflight() {
        assert!(!looks_factual("Use calculator: what is 3*7+2?", TOOLS));
        assert!(!looks_factual("Call web_search for the latest news", TOOLS));
        assert!(!looks_factual("MEMORY_SET color to blue?", TOOLS));
    }

    #[test]
    fn dependency_failures() {
        assert!(is_unrecoverable_failure(&ToolResult::failure(
            "embedding failed: Authentication failed: Invalid API key"
        )));
        assert!(is_unrecoverable_failure(&ToolResult::failure(
            "tool error: Dependency unavailable: embedding failed: Provider 'x' does not support embeddings"
        )));
        assert!(is_unrecoverable_failure(&ToolResult::failure(
            "No module named 'trafilatura'"
        )));
        assert!(is_unrecoverable_failure(&ToolResult::failure(
            "OpenAI SDK no disponible"
        )));
        assert!(!is_unrecoverable_failure(&ToolResult::failure(
            "could not download URL: status 404"
        )));
        assert!(!is_unrecoverable_failure(&ToolResult::success(
            serde_json::json!("api key")
        )));
    }
}
