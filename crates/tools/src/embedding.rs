//! Single-text embedding shared by the tools that compare by similarity.

use scoutclaw_core::error::{ProviderError, ToolError};
use scoutclaw_core::provider::{EmbeddingRequest, Provider};
use scoutclaw_core::tool::ToolResult;

/// Embed `text` with `model`.
///
/// A provider without credentials or without embedding support is a
/// [`ToolError::DependencyUnavailable`]; any other failure comes back as a
/// failing envelope in the inner `Err` for the caller to return as is.
pub(crate) async fn embed_one(
    provider: &dyn Provider,
    model: &str,
    text: &str,
) -> Result<Result<Vec<f32>, ToolResult>, ToolError> {
    let response = match provider
        .embed(EmbeddingRequest {
            model: model.to_string(),
            inputs: vec![text.to_string()],
        })
        .await
    {
        Ok(r) => r,
        Err(e @ (ProviderError::AuthenticationFailed(_) | ProviderError::NotConfigured(_))) => {
            return Err(ToolError::DependencyUnavailable(format!("embedding failed: {e}")));
        }
        Err(e) => return Ok(Err(ToolResult::failure(format!("embedding failed: {e}")))),
    };
    Ok(response
        .embeddings
        .into_iter()
        .next()
        .ok_or_else(|| ToolResult::failure("embedding failed: provider returned no vectors")))
}
