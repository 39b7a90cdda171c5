use providers::github::RawIssue;
use serde::{Deserialize, Serialize};

/// One retrieved issue, immutable for the request's lifetime. The html URL is
/// the canonical identity used for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
    pub author: Option<String>,
    pub labels: Vec<String>,
    pub repository_url: Option<String>,
}

impl Candidate {
    /// The text embedded for this candidate: title and body concatenated.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.body.as_deref().unwrap_or_default()
        )
    }
}

impl From<RawIssue> for Candidate {
    fn from(issue: RawIssue) -> Self {
        Self {
            url: issue.html_url,
            id: issue.id,
            title: issue.title,
            body: issue.body,
            created_at: issue.created_at,
            author: issue.user.and_then(|u| u.login),
            labels: issue.labels.into_iter().filter_map(|l| l.name).collect(),
            repository_url: issue.repository_url,
        }
    }
}

fn default_top_k() -> usize {
    10
}

/// Boundary input for one matching request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub query_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// One ranked recommendation in the boundary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueMatch {
    pub issue_id: Option<i64>,
    pub issue_url: Option<String>,
    pub repo_url: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub user_login: Option<String>,
    pub labels: Option<Vec<String>>,
    pub similarity_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub recommendations: Vec<IssueMatch>,
    pub issues_fetched: usize,
    pub issues_indexed: usize,
    pub message: String,
}

impl MatchResponse {
    /// A well-formed response carrying no recommendations, used for both the
    /// valid empty outcome and failure outcomes.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            recommendations: Vec::new(),
            issues_fetched: 0,
            issues_indexed: 0,
            message: message.into(),
        }
    }
}
