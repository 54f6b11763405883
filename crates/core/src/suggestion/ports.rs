//! Port interfaces for suggestion generation

use async_trait::async_trait;
use kintai_domain::{Result, TokenUsage};

/// Output of an AI summarization call.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Trait for the AI provider that upgrades deterministic summaries into
/// natural-language descriptions.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Rewrite a deterministic activity summary as a single-line,
    /// business-facing description.
    async fn summarize(&self, summary: &str) -> Result<ModelSummary>;
}

/// Trait for the keyed AI-usage counter store.
///
/// Injected as a dependency rather than a module-level singleton so tests
/// can substitute an in-memory implementation.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Usage for an identity/period; a zeroed row when none exists yet.
    async fn usage(&self, identity: &str, period: &str) -> Result<TokenUsage>;

    /// Atomic upsert-increment: create the row if absent, otherwise add to
    /// the existing counters. Rows are never deleted.
    async fn record(
        &self,
        identity: &str,
        period: &str,
        requests: u32,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<()>;
}

/// Mapping of a client identifier to the repositories of interest, used to
/// filter which activity records feed the assembler.
pub trait RepoRouter: Send + Sync {
    /// Repositories associated with the client, or `None` when the client is
    /// unknown (no filtering applies).
    fn repos_for(&self, client_id: &str) -> Option<Vec<String>>;
}
