//! Per-bucket description generation.
//!
//! A deterministic summary is always computed first; when an AI model is
//! configured and the identity still has quota, the summary is rewritten
//! into a natural-language description. Any failure on the AI path falls
//! back to the deterministic text — description generation must never fail
//! the suggestion pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kintai_domain::constants::{SUMMARY_MAX_PR_TITLES, SUMMARY_PLACEHOLDER};
use kintai_domain::{ActivityRecord, EventKind, PrAction};
use tracing::{debug, warn};

use super::ports::SummaryModel;
use super::quota::QuotaService;

/// Description for one workday bucket plus the tokens it cost.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub text: String,
    /// Zero when the deterministic fallback was used.
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl SummaryResult {
    fn fallback(text: String) -> Self {
        Self { text, input_tokens: 0, output_tokens: 0 }
    }
}

/// Produces a human-readable description per workday bucket.
pub struct DescriptionSummarizer {
    model: Option<Arc<dyn SummaryModel>>,
    quota: Arc<QuotaService>,
    model_timeout: Duration,
}

impl DescriptionSummarizer {
    pub fn new(
        model: Option<Arc<dyn SummaryModel>>,
        quota: Arc<QuotaService>,
        model_timeout: Duration,
    ) -> Self {
        Self { model, quota, model_timeout }
    }

    /// Describe one day's records.
    ///
    /// `identity` and `period` key the AI quota; they identify the requester
    /// issuing the suggestion, not the data owner.
    pub async fn describe(
        &self,
        records: &[ActivityRecord],
        identity: &str,
        period: &str,
    ) -> SummaryResult {
        let fallback = deterministic_summary(records);
        if fallback == SUMMARY_PLACEHOLDER {
            return SummaryResult::fallback(fallback);
        }

        let Some(model) = self.model.as_ref() else {
            return SummaryResult::fallback(fallback);
        };

        match self.quota.check(identity, period).await {
            Ok(status) if status.allows_request() => {}
            Ok(status) => {
                debug!(identity, period, used = status.used, "AI quota reached, using fallback");
                return SummaryResult::fallback(fallback);
            }
            Err(err) => {
                warn!(error = %err, "quota check failed, using fallback");
                return SummaryResult::fallback(fallback);
            }
        }

        match tokio::time::timeout(self.model_timeout, model.summarize(&fallback)).await {
            Ok(Ok(summary)) if !summary.text.trim().is_empty() => {
                if let Err(err) = self
                    .quota
                    .record(identity, period, summary.input_tokens, summary.output_tokens)
                    .await
                {
                    warn!(error = %err, "failed to record AI usage");
                }
                SummaryResult {
                    text: summary.text.trim().to_string(),
                    input_tokens: summary.input_tokens,
                    output_tokens: summary.output_tokens,
                }
            }
            Ok(Ok(_)) => {
                warn!("AI summary was empty, using fallback");
                SummaryResult::fallback(fallback)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "AI summarization failed, using fallback");
                SummaryResult::fallback(fallback)
            }
            Err(_) => {
                warn!(timeout = ?self.model_timeout, "AI summarization timed out, using fallback");
                SummaryResult::fallback(fallback)
            }
        }
    }
}

/// Compact deterministic summary of one day's records.
///
/// Commits are summed per repository, PR titles deduplicated keeping the
/// highest-priority action (merged > closed > opened) and capped to the
/// first three, reviews and comments reduced to counts.
pub fn deterministic_summary(records: &[ActivityRecord]) -> String {
    let mut commit_repos: Vec<Option<String>> = Vec::new();
    let mut commit_counts: HashMap<Option<String>, u64> = HashMap::new();
    let mut pr_titles: Vec<String> = Vec::new();
    let mut pr_actions: HashMap<String, Option<PrAction>> = HashMap::new();
    let mut review_count: u64 = 0;
    let mut comment_count: u64 = 0;

    for record in records {
        match &record.kind {
            EventKind::Commit => {
                let key = record.repo.clone();
                if !commit_counts.contains_key(&key) {
                    commit_repos.push(key.clone());
                }
                *commit_counts.entry(key).or_insert(0) += record.commit_count();
            }
            EventKind::PullRequest => {
                let Some(title) = record.title.as_deref() else { continue };
                let action = record.pr_action();
                match pr_actions.get_mut(title) {
                    Some(existing) => {
                        // Keep the highest-priority action per title
                        if action > *existing {
                            *existing = action;
                        }
                    }
                    None => {
                        pr_titles.push(title.to_string());
                        pr_actions.insert(title.to_string(), action);
                    }
                }
            }
            EventKind::Review => review_count += 1,
            EventKind::IssueComment => comment_count += 1,
            EventKind::Other(_) => {}
        }
    }

    let mut parts: Vec<String> = Vec::new();

    for repo in &commit_repos {
        let count = commit_counts.get(repo).copied().unwrap_or(0);
        match repo {
            Some(name) => parts.push(format!("{name}: {count}commits")),
            None => parts.push(format!("{count}commits")),
        }
    }

    for title in pr_titles.iter().take(SUMMARY_MAX_PR_TITLES) {
        match pr_actions.get(title).copied().flatten() {
            Some(action) => parts.push(format!("{title} ({action})")),
            None => parts.push(title.clone()),
        }
    }

    if review_count > 0 {
        parts.push(format!("{review_count} reviews"));
    }
    if comment_count > 0 {
        parts.push(format!("{comment_count} comments"));
    }

    if parts.is_empty() {
        SUMMARY_PLACEHOLDER.to_string()
    } else {
        parts.join(", ")
    }
}
