//! GitHub search API client for candidate issue retrieval.

use crate::ProviderError;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    cfg: GitHubConfig,
}

impl GitHubClient {
    pub fn new(cfg: GitHubConfig) -> Result<Self, ProviderError> {
        // GitHub rejects requests without a User-Agent header.
        let client = Client::builder()
            .user_agent(concat!("issue-matcher/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, cfg })
    }

    /// Search open issues (not pull requests) carrying a label equal to `keyword`,
    /// capped at `per_page` results.
    pub async fn search_issues(
        &self,
        keyword: &str,
        per_page: usize,
    ) -> Result<Vec<RawIssue>, ProviderError> {
        let url = format!("{}/search/issues", self.cfg.api_base);
        let query = format!("label:\"{keyword}\" state:open type:issue");
        let per_page = per_page.to_string();
        let mut builder = self
            .client
            .get(url)
            .query(&[("q", query.as_str()), ("per_page", per_page.as_str())])
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.cfg.token {
            builder = builder.bearer_auth(token);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let hint = match status.as_u16() {
                401 => " (unauthorized, check the GitHub token)",
                403 => " (rate limited or authentication required)",
                _ => "",
            };
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {}{} body {:?}",
                status, hint, body
            )));
        }
        let parsed: IssueSearchResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(parsed.items)
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueSearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RawIssue>,
}

/// One issue as returned by the search endpoint. Fields the matcher does not
/// consume are left out; unknown fields are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub id: Option<i64>,
    pub html_url: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
    pub user: Option<IssueAuthor>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub repository_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueAuthor {
    pub login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueLabel {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue_json(id: i64, url: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "html_url": url,
            "title": format!("Issue {id}"),
            "body": "Some body",
            "created_at": "2024-01-01T00:00:00Z",
            "user": { "login": "octocat" },
            "labels": [ { "name": "good first issue" } ],
            "repository_url": "https://api.github.com/repos/owner/repo"
        })
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(GitHubConfig {
            api_base: server.uri(),
            token: token.map(String::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn search_builds_label_query_and_parses_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "label:\"rust\" state:open type:issue"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 1,
                "items": [issue_json(1, "https://github.com/owner/repo/issues/1")]
            })))
            .mount(&server)
            .await;

        let items = client_for(&server, None).search_issues("rust", 5).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, Some(1));
        assert_eq!(items[0].labels[0].name.as_deref(), Some("good first issue"));
    }

    #[tokio::test]
    async fn search_sends_bearer_token_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(header("Authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 0,
                "items": []
            })))
            .mount(&server)
            .await;

        let items = client_for(&server, Some("sekrit"))
            .search_issues("python", 5)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn search_maps_rate_limit_status_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .search_issues("rust", 5)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("rate limited"));
    }
}
