//! Per-keyword candidate retrieval with isolated failures.

use crate::models::Candidate;
use providers::github::GitHubClient;
use tracing::{debug, warn};

/// Fetch candidate issues for every keyword concurrently and join all
/// outcomes. A failed keyword is logged and contributes zero candidates; it
/// never aborts the other keywords. No retries.
pub async fn fetch_candidates(
    client: &GitHubClient,
    keywords: &[String],
    per_keyword: usize,
) -> Vec<Candidate> {
    let futures: Vec<_> = keywords
        .iter()
        .map(|keyword| async move {
            let result = client.search_issues(keyword, per_keyword).await;
            (keyword.as_str(), result)
        })
        .collect();

    let outcomes = futures::future::join_all(futures).await;

    let mut all = Vec::new();
    for (keyword, outcome) in outcomes {
        match outcome {
            Ok(items) => {
                debug!(keyword, count = items.len(), "keyword returned issues");
                all.extend(items.into_iter().map(Candidate::from));
            }
            Err(err) => {
                warn!(keyword, error = %err, "keyword fetch failed");
            }
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::github::{GitHubConfig, GitHubClient};
    use wiremock::matchers::{method, path, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body(urls: &[&str]) -> serde_json::Value {
        let items: Vec<serde_json::Value> = urls
            .iter()
            .map(|u| {
                serde_json::json!({
                    "id": 1,
                    "html_url": u,
                    "title": "t",
                    "repository_url": "https://api.github.com/repos/o/r"
                })
            })
            .collect();
        serde_json::json!({ "total_count": items.len(), "items": items })
    }

    #[tokio::test]
    async fn failed_keyword_does_not_abort_the_others() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", "rust"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(search_body(&["https://github.com/o/r/issues/1"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", "python"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", "easy"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(search_body(&["https://github.com/o/r/issues/2"])),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(GitHubConfig {
            api_base: server.uri(),
            token: None,
            timeout_secs: 5,
        })
        .unwrap();

        let keywords = vec!["rust".to_string(), "python".to_string(), "easy".to_string()];
        let candidates = fetch_candidates(&client, &keywords, 5).await;

        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://github.com/o/r/issues/1",
                "https://github.com/o/r/issues/2"
            ]
        );
    }

    #[tokio::test]
    async fn no_keywords_fetches_nothing() {
        let server = MockServer::start().await;
        let client = GitHubClient::new(GitHubConfig {
            api_base: server.uri(),
            token: None,
            timeout_secs: 5,
        })
        .unwrap();
        let candidates = fetch_candidates(&client, &[], 5).await;
        assert!(candidates.is_empty());
    }
}
