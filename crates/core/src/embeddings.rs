use crate::error::MatchError;
use providers::ProviderRegistry;

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub texts: Vec<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub vectors: Vec<Vec<f32>>,
}

/// Embed a batch of texts through the registry's selected provider. One
/// vector per input text, same order.
pub async fn embed(
    req: EmbeddingRequest,
    registry: &ProviderRegistry,
) -> Result<EmbeddingResult, MatchError> {
    let provider = registry.embedding(req.provider.as_deref())?;
    let resp = provider.embed(&req.texts).await?;
    Ok(EmbeddingResult {
        vectors: resp.vectors,
    })
}
