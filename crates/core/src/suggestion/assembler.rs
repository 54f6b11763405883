//! Suggestion assembly: buckets, windows, descriptions, conflicts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use kintai_domain::{
    ActivityRecord, DateRange, ExistingEntry, Owner, SourceKind, Suggestion, SuggestedEntry,
};
use tracing::{info, warn};

use super::ports::RepoRouter;
use super::summarizer::DescriptionSummarizer;
use crate::suggestion::bucketer::WorkdayBucketer;
use crate::sync::ports::{ActivityGateway, CredentialCipher, CredentialStore};

/// Existing timesheet rows keyed by workday, used for conflict flagging.
pub type ExistingEntries = HashMap<NaiveDate, ExistingEntry>;

/// Top-level orchestrator turning activity records into ordered suggested
/// entries.
pub struct SuggestionAssembler {
    bucketer: WorkdayBucketer,
    summarizer: Arc<DescriptionSummarizer>,
}

impl SuggestionAssembler {
    pub fn new(bucketer: WorkdayBucketer, summarizer: Arc<DescriptionSummarizer>) -> Self {
        Self { bucketer, summarizer }
    }

    /// Assemble suggestions from already-fetched activity records.
    ///
    /// Days are independent, so their descriptions are generated
    /// concurrently; latency is bounded by the slowest single day. The
    /// assembler never writes timesheet data - conflict flags are
    /// informational and the caller decides whether to apply.
    pub async fn suggest(
        &self,
        activities: Vec<ActivityRecord>,
        existing: &ExistingEntries,
        identity: &str,
        period: &str,
    ) -> Suggestion {
        let buckets = self.bucketer.bucket(activities);
        if buckets.is_empty() {
            return Suggestion {
                entries: Vec::new(),
                reasoning: "No activity found in the requested range.".to_string(),
            };
        }

        let days = buckets
            .into_iter()
            .map(|(date, records)| {
                let window = self.bucketer.window(&records);
                let summarizer = Arc::clone(&self.summarizer);
                async move {
                    let summary = summarizer.describe(&records, identity, period).await;
                    SuggestedEntry {
                        work_date: date,
                        start_minutes: window.start_minutes,
                        end_minutes: window.end_minutes,
                        break_minutes: window.break_minutes,
                        description: summary.text,
                        conflicted: false,
                    }
                }
            })
            .collect::<Vec<_>>();

        // BTreeMap iteration is date-ascending and join_all preserves input
        // order, so the entries come back already sorted by workday.
        let mut entries = join_all(days).await;

        for entry in &mut entries {
            entry.conflicted = existing
                .get(&entry.work_date)
                .is_some_and(ExistingEntry::has_recorded_time);
        }

        let total_minutes: u64 = entries.iter().map(|e| u64::from(e.worked_minutes())).sum();
        let reasoning = format!(
            "Suggested {} entries covering {:.1} hours of work.",
            entries.len(),
            total_minutes as f64 / 60.0
        );

        info!(entries = entries.len(), total_minutes, "assembled suggestion");
        Suggestion { entries, reasoning }
    }
}

/// Suggestion pipeline including the upstream fetch.
///
/// Absence of provider data is a normal, expected state (not configured,
/// token revoked, no activity in the range): every upstream failure degrades
/// to an empty suggestion with an explanatory reasoning line instead of an
/// error to the interactive caller.
pub struct SuggestionService {
    assembler: SuggestionAssembler,
    gateway: Arc<dyn ActivityGateway>,
    credentials: Arc<dyn CredentialStore>,
    cipher: Arc<dyn CredentialCipher>,
    router: Arc<dyn RepoRouter>,
}

impl SuggestionService {
    pub fn new(
        assembler: SuggestionAssembler,
        gateway: Arc<dyn ActivityGateway>,
        credentials: Arc<dyn CredentialStore>,
        cipher: Arc<dyn CredentialCipher>,
        router: Arc<dyn RepoRouter>,
    ) -> Self {
        Self { assembler, gateway, credentials, cipher, router }
    }

    /// Fetch the owner's activity for the range and assemble suggestions.
    ///
    /// `client_id` optionally narrows the records to the repositories of
    /// interest for that client before bucketing.
    pub async fn suggest_for_range(
        &self,
        owner: &Owner,
        client_id: Option<&str>,
        range: DateRange,
        existing: &ExistingEntries,
        identity: &str,
        period: &str,
    ) -> Suggestion {
        let ciphertext =
            match self.credentials.get(owner, &SourceKind::Github).await {
                Ok(Some(ciphertext)) => ciphertext,
                Ok(None) => {
                    return Suggestion {
                        entries: Vec::new(),
                        reasoning: "GitHub is not connected for this user.".to_string(),
                    }
                }
                Err(err) => {
                    warn!(error = %err, "credential lookup failed");
                    return Suggestion {
                        entries: Vec::new(),
                        reasoning: "Could not load the GitHub credential.".to_string(),
                    };
                }
            };

        let token = match self.cipher.decrypt(&ciphertext) {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "credential decryption failed");
                return Suggestion {
                    entries: Vec::new(),
                    reasoning:
                        "The stored GitHub credential is invalid; please re-authenticate."
                            .to_string(),
                };
            }
        };

        let mut activities =
            match self.gateway.fetch_activities(&token, &owner.user_id, range).await {
                Ok(activities) => activities,
                Err(err) => {
                    warn!(error = %err, "activity fetch failed");
                    return Suggestion {
                        entries: Vec::new(),
                        reasoning: "GitHub activity could not be fetched.".to_string(),
                    };
                }
            };

        if let Some(repos) = client_id.and_then(|id| self.router.repos_for(id)) {
            activities.retain(|record| {
                record.repo.as_deref().is_some_and(|repo| repos.iter().any(|r| r == repo))
            });
        }

        self.assembler.suggest(activities, existing, identity, period).await
    }
}
