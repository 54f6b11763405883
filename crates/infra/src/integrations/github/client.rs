/// GitHub REST gateway for developer activity
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use kintai_core::ActivityGateway;
use kintai_domain::{
    workday_date, ActivityRecord, DateRange, EventKind, KintaiError, PrAction, Result, SourceKind,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::http::HttpClient;

use super::types::{CommitItem, IssueItem, SearchResponse};

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;
const API_VERSION: &str = "2022-11-28";

/// Gateway over the GitHub search API.
///
/// Pagination and the individual search queries are hidden behind
/// `fetch_activities`; every returned record is already attributed to a
/// workday via the 30-hour clock.
pub struct GithubGateway {
    http: HttpClient,
    api_url: String,
    offset: FixedOffset,
}

impl GithubGateway {
    pub fn new(http: HttpClient, api_url: impl Into<String>, offset: FixedOffset) -> Self {
        Self { http, api_url: api_url.into(), offset }
    }

    async fn search<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
        query: &str,
        page: usize,
    ) -> Result<SearchResponse<T>> {
        let mut url = Url::parse(&format!("{}/search/{}", self.api_url, endpoint))
            .map_err(|e| KintaiError::Config(format!("invalid GitHub API URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let builder = self
            .http
            .request(Method::GET, url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        let response = self.http.send(builder).await?;
        let status = response.status();
        debug!(endpoint, page, status = status.as_u16(), "GitHub search response");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(KintaiError::Credential(format!(
                "GitHub rejected the access token ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KintaiError::Network(format!("GitHub search failed ({status}): {body}")));
        }

        response
            .json::<SearchResponse<T>>()
            .await
            .map_err(|e| KintaiError::Network(format!("unexpected GitHub response body: {e}")))
    }

    /// Run one search query across all result pages.
    async fn search_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let response = self.search::<T>(endpoint, token, query, page).await?;
            let fetched = response.items.len();
            items.extend(response.items);
            if fetched < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }

    async fn fetch_commits(
        &self,
        token: &str,
        login: &str,
        range: DateRange,
    ) -> Result<Vec<ActivityRecord>> {
        let query =
            format!("author:{login} author-date:{}..{}", range.start, range.end);
        let items: Vec<CommitItem> = self.search_all("commits", token, &query).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let ts = parse_instant(&item.commit.author.date)?;
                let title = item.commit.message.lines().next().map(str::to_string);
                Some(ActivityRecord {
                    source: SourceKind::Github,
                    kind: EventKind::Commit,
                    event_date: workday_date(ts, self.offset),
                    event_timestamp: ts,
                    repo: Some(item.repository.full_name),
                    title,
                    url: item.html_url,
                    metadata: json!({ "count": 1 }),
                })
            })
            .collect())
    }

    async fn fetch_pull_requests(
        &self,
        token: &str,
        login: &str,
        range: DateRange,
    ) -> Result<Vec<ActivityRecord>> {
        let queries = [
            (PrAction::Opened, format!("type:pr author:{login} created:{}..{}", range.start, range.end)),
            (PrAction::Merged, format!("type:pr author:{login} merged:{}..{}", range.start, range.end)),
            (
                PrAction::Closed,
                format!(
                    "type:pr author:{login} is:closed is:unmerged closed:{}..{}",
                    range.start, range.end
                ),
            ),
        ];

        let mut records = Vec::new();
        for (action, query) in queries {
            let items: Vec<IssueItem> = self.search_all("issues", token, &query).await?;
            for item in items {
                let raw_ts = match action {
                    PrAction::Opened => item.created_at.clone(),
                    PrAction::Merged => item
                        .pull_request
                        .as_ref()
                        .and_then(|pr| pr.merged_at.clone())
                        .unwrap_or_else(|| item.updated_at.clone()),
                    PrAction::Closed => {
                        item.closed_at.clone().unwrap_or_else(|| item.updated_at.clone())
                    }
                };
                let Some(ts) = parse_instant(&raw_ts) else {
                    warn!(title = %item.title, "skipping pull request with unparseable timestamp");
                    continue;
                };
                records.push(ActivityRecord {
                    source: SourceKind::Github,
                    kind: EventKind::PullRequest,
                    event_date: workday_date(ts, self.offset),
                    event_timestamp: ts,
                    repo: item.repo_full_name(),
                    title: Some(item.title),
                    url: item.html_url,
                    metadata: json!({ "action": action.as_str() }),
                });
            }
        }
        Ok(records)
    }

    async fn fetch_involvement(
        &self,
        token: &str,
        kind: EventKind,
        query: String,
    ) -> Result<Vec<ActivityRecord>> {
        let items: Vec<IssueItem> = self.search_all("issues", token, &query).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let ts = parse_instant(&item.updated_at)?;
                Some(ActivityRecord {
                    source: SourceKind::Github,
                    kind: kind.clone(),
                    event_date: workday_date(ts, self.offset),
                    event_timestamp: ts,
                    repo: item.repo_full_name(),
                    title: Some(item.title),
                    url: item.html_url,
                    metadata: serde_json::Value::Null,
                })
            })
            .collect())
    }
}

#[async_trait]
impl ActivityGateway for GithubGateway {
    async fn fetch_activities(
        &self,
        token: &str,
        login: &str,
        range: DateRange,
    ) -> Result<Vec<ActivityRecord>> {
        let mut records = self.fetch_commits(token, login, range).await?;
        records.extend(self.fetch_pull_requests(token, login, range).await?);
        records.extend(
            self.fetch_involvement(
                token,
                EventKind::Review,
                format!(
                    "type:pr reviewed-by:{login} -author:{login} updated:{}..{}",
                    range.start, range.end
                ),
            )
            .await?,
        );
        records.extend(
            self.fetch_involvement(
                token,
                EventKind::IssueComment,
                format!("type:issue commenter:{login} updated:{}..{}", range.start, range.end),
            )
            .await?,
        );

        info!(login, total = records.len(), "fetched GitHub activity");
        Ok(records)
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            warn!(raw, error = %err, "skipping event with unparseable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const JST: i32 = 9 * 3600;

    fn gateway(api_url: String) -> GithubGateway {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .max_attempts(1)
            .build()
            .expect("http client");
        GithubGateway::new(http, api_url, FixedOffset::east_opt(JST).unwrap())
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    fn commit_body(dates: &[&str]) -> serde_json::Value {
        let items: Vec<serde_json::Value> = dates
            .iter()
            .map(|date| {
                json!({
                    "commit": {
                        "message": "Add feature\n\nlonger body",
                        "author": { "date": date }
                    },
                    "repository": { "full_name": "acme/app" },
                    "html_url": "https://github.com/acme/app/commit/abc123"
                })
            })
            .collect();
        json!({ "total_count": items.len(), "items": items })
    }

    fn empty_search() -> serde_json::Value {
        json!({ "total_count": 0, "items": [] })
    }

    async fn mount_empty_issue_search(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(empty_search()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn pre_dawn_commit_lands_on_previous_workday() {
        let server = MockServer::start().await;
        // 2025-01-14T20:30:00Z is 05:30 JST on the 15th, before the 06:00
        // workday boundary
        Mock::given(method("GET"))
            .and(path("/search/commits"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(commit_body(&["2025-01-14T20:30:00Z"])),
            )
            .mount(&server)
            .await;
        mount_empty_issue_search(&server).await;

        let records =
            gateway(server.uri()).fetch_activities("token", "alice", range()).await.expect("fetch");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, EventKind::Commit);
        assert_eq!(records[0].event_date, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
        assert_eq!(records[0].repo.as_deref(), Some("acme/app"));
        assert_eq!(records[0].title.as_deref(), Some("Add feature"));
        assert_eq!(records[0].commit_count(), 1);
    }

    #[tokio::test]
    async fn merged_pull_request_carries_action_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(empty_search()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", "merged:"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "items": [{
                    "title": "Add feature",
                    "html_url": "https://github.com/acme/app/pull/7",
                    "repository_url": "https://api.github.com/repos/acme/app",
                    "created_at": "2025-01-14T09:00:00Z",
                    "updated_at": "2025-01-15T09:00:00Z",
                    "closed_at": "2025-01-15T09:00:00Z",
                    "pull_request": { "merged_at": "2025-01-15T09:00:00Z" }
                }]
            })))
            .mount(&server)
            .await;
        mount_empty_issue_search(&server).await;

        let records =
            gateway(server.uri()).fetch_activities("token", "alice", range()).await.expect("fetch");

        let pr: Vec<_> =
            records.iter().filter(|r| r.kind == EventKind::PullRequest).collect();
        assert_eq!(pr.len(), 1);
        assert_eq!(pr[0].pr_action(), Some(PrAction::Merged));
        assert_eq!(
            pr[0].event_timestamp,
            DateTime::parse_from_rfc3339("2025-01-15T09:00:00Z").unwrap().with_timezone(&Utc)
        );
    }

    #[tokio::test]
    async fn rejected_token_is_a_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/commits"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = gateway(server.uri())
            .fetch_activities("bad-token", "alice", range())
            .await
            .expect_err("should fail");

        assert!(err.needs_reauth(), "expected credential error, got {err:?}");
    }

    #[tokio::test]
    async fn commit_search_follows_pagination() {
        let server = MockServer::start().await;
        let full_page: Vec<&str> = vec!["2025-01-15T09:00:00Z"; PER_PAGE];
        Mock::given(method("GET"))
            .and(path("/search/commits"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commit_body(&full_page)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/commits"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(commit_body(&["2025-01-15T10:00:00Z"])),
            )
            .mount(&server)
            .await;
        mount_empty_issue_search(&server).await;

        let records =
            gateway(server.uri()).fetch_activities("token", "alice", range()).await.expect("fetch");

        assert_eq!(records.iter().filter(|r| r.kind == EventKind::Commit).count(), PER_PAGE + 1);
    }
}
