//! Local sentence-embedding provider backed by fastembed ONNX models.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};

pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Embedding provider running a local sentence-transformer model.
///
/// The model is loaded lazily on first use and shared process-wide for the
/// provider's lifetime. Concurrent first calls coordinate on a single load
/// attempt; a failed load leaves the cell empty so a later request retries.
pub struct LocalProvider {
    model_name: String,
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalProvider {
    pub fn new(model_name: &str) -> Self {
        let model_name = if model_name.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model_name.to_string()
        };
        Self {
            model_name,
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>, ProviderError> {
        self.model
            .get_or_try_init(|| async {
                let which = embedding_model(&self.model_name)?;
                tracing::info!(model = %self.model_name, "loading embedding model");
                let loaded = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(
                        InitOptions::new(which).with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| ProviderError::ModelInit(e.to_string()))?
                .map_err(|e| ProviderError::ModelInit(e.to_string()))?;
                tracing::info!(model = %self.model_name, "embedding model ready");
                Ok(Arc::new(Mutex::new(loaded)))
            })
            .await
            .cloned()
    }
}

fn embedding_model(name: &str) -> Result<EmbeddingModel, ProviderError> {
    match name {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-large-en-v1.5" => Ok(EmbeddingModel::BGELargeENV15),
        other => Err(ProviderError::UnknownModel(other.to_string())),
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let model = self.model().await?;
        let batch = texts.to_vec();
        // Inference is CPU-bound; keep it off the async runtime.
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| ProviderError::RequestFailed("embedding model lock poisoned".into()))?;
            model
                .embed(batch, None)
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))??;
        Ok(EmbedResponse { vectors })
    }
}
