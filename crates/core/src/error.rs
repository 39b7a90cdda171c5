use providers::ProviderError;
use thiserror::Error;

/// Stage errors internal to the matching pipeline. They never cross the
/// orchestration boundary: `pipeline::match_issues` folds them into the
/// response message.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("similarity index error: {0}")]
    Index(String),
}

impl From<ProviderError> for MatchError {
    fn from(e: ProviderError) -> Self {
        MatchError::Embedding(e.to_string())
    }
}
