/// GitHub REST search API types
use serde::Deserialize;

/// Generic envelope for `/search/*` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse<T> {
    #[allow(dead_code)]
    pub total_count: u64,
    pub items: Vec<T>,
}

/// One item from `/search/commits`.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitItem {
    pub commit: CommitDetail,
    pub repository: CommitRepository,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitAuthor {
    /// Author timestamp, ISO-8601.
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRepository {
    pub full_name: String,
}

/// One item from `/search/issues` (covers both issues and pull requests).
#[derive(Debug, Deserialize)]
pub(crate) struct IssueItem {
    pub title: String,
    pub html_url: Option<String>,
    /// API URL of the owning repository, e.g.
    /// `https://api.github.com/repos/acme/app`.
    pub repository_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    /// Present only when the item is a pull request.
    pub pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestRef {
    pub merged_at: Option<String>,
}

impl IssueItem {
    /// `owner/name` extracted from `repository_url`.
    pub(crate) fn repo_full_name(&self) -> Option<String> {
        let mut segments = self.repository_url.rsplit('/');
        let name = segments.next()?;
        let owner = segments.next()?;
        if name.is_empty() || owner.is_empty() {
            return None;
        }
        Some(format!("{owner}/{name}"))
    }
}
