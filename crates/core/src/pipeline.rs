use crate::config::AppConfig;
use crate::embeddings::{self, EmbeddingRequest};
use crate::error::MatchError;
use crate::index::IssueIndex;
use crate::models::{Candidate, IssueMatch, MatchRequest, MatchResponse};
use crate::{dedupe, fetcher, keywords};
use providers::github::{GitHubClient, GitHubConfig};
use providers::local::LocalProvider;
use providers::noop::NoopProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::{ProviderError, ProviderRegistry};
use std::sync::Arc;
use tracing::{error, info};

pub const NO_ISSUES_MESSAGE: &str = "No issues found for the given keywords";
pub const SUCCESS_MESSAGE: &str = "Successfully matched issues";

/// Run the full matching pipeline: expand keywords, fetch candidates, dedupe,
/// embed, index, search, format.
///
/// This is the orchestration boundary: it always returns a well-formed
/// response. Zero candidates is a valid empty outcome; any stage error is
/// folded into the response message instead of propagating.
pub async fn match_issues(
    req: MatchRequest,
    config: &AppConfig,
    registry: &ProviderRegistry,
    github: &GitHubClient,
) -> MatchResponse {
    match run_pipeline(req, config, registry, github).await {
        Ok(resp) => resp,
        Err(err) => {
            error!(error = %err, "match pipeline failed");
            MatchResponse::empty(format!("Error matching issues: {err}"))
        }
    }
}

async fn run_pipeline(
    req: MatchRequest,
    config: &AppConfig,
    registry: &ProviderRegistry,
    github: &GitHubClient,
) -> Result<MatchResponse, MatchError> {
    let search_keywords = keywords::expand(&req.keywords, &req.languages, &req.topics);
    info!(keywords = ?search_keywords, "fetching candidate issues");

    let fetched = fetcher::fetch_candidates(github, &search_keywords, config.github.per_keyword).await;
    let unique = dedupe::dedupe_by_url(fetched);
    if unique.is_empty() {
        info!("no candidate issues fetched");
        return Ok(MatchResponse::empty(NO_ISSUES_MESSAGE));
    }
    let issues_fetched = unique.len();
    info!(count = issues_fetched, "deduplicated candidate pool");

    // One batch call for all candidate texts, one for the query.
    let texts: Vec<String> = unique.iter().map(Candidate::embedding_text).collect();
    let candidate_vectors = embeddings::embed(
        EmbeddingRequest {
            texts,
            provider: None,
        },
        registry,
    )
    .await?;
    let query = embeddings::embed(
        EmbeddingRequest {
            texts: vec![req.query_text.clone()],
            provider: None,
        },
        registry,
    )
    .await?;
    let query_vector = query
        .vectors
        .into_iter()
        .next()
        .ok_or_else(|| MatchError::Embedding("model returned no query vector".into()))?;

    let index = IssueIndex::build(unique, &candidate_vectors.vectors)?;
    info!(ntotal = index.ntotal(), "similarity index built");

    let hits = index.search(&query_vector, req.top_k)?;
    let recommendations: Vec<IssueMatch> = hits
        .into_iter()
        .map(|(candidate, distance)| format_match(candidate, distance))
        .collect();
    info!(count = recommendations.len(), "matched issues");

    Ok(MatchResponse {
        recommendations,
        issues_fetched,
        issues_indexed: index.ntotal(),
        message: SUCCESS_MESSAGE.to_string(),
    })
}

fn format_match(candidate: &Candidate, distance: f32) -> IssueMatch {
    IssueMatch {
        issue_id: candidate.id,
        issue_url: Some(candidate.url.clone()),
        repo_url: candidate
            .repository_url
            .as_ref()
            .map(|u| u.replace("api.github.com/repos", "github.com")),
        title: candidate.title.clone(),
        created_at: candidate.created_at.clone(),
        user_login: candidate.author.clone(),
        labels: Some(candidate.labels.clone()),
        similarity_score: Some(similarity_score(distance)),
    }
}

/// Fold a squared-L2 distance into a ranking score. For unit-normalized
/// embeddings this equals the cosine similarity; it is a monotonic ranking
/// signal, not a calibrated probability.
fn similarity_score(distance: f32) -> f32 {
    1.0 - distance / 2.0
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new()
        .with_embedding("noop", Arc::new(NoopProvider))
        .with_embedding("local", Arc::new(LocalProvider::new(&config.embeddings.model)));

    if let (Some(key), Some(base)) = (
        std::env::var_os("OPENAI_API_KEY"),
        std::env::var_os("OPENAI_BASE_URL"),
    ) {
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: key.to_string_lossy().into_owned(),
            base_url: base.to_string_lossy().into_owned(),
            embedding_model: config.embeddings.model.clone(),
        });
        reg = reg.with_embedding("openai", Arc::new(provider));
    }

    reg.set_preferred_embedding(&config.embeddings.provider)
}

pub fn build_github(config: &AppConfig, token: Option<String>) -> Result<GitHubClient, ProviderError> {
    GitHubClient::new(GitHubConfig {
        api_base: config.github.api_base.clone(),
        token,
        timeout_secs: config.github.timeout_secs,
    })
}
