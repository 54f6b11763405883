//! Advisory quota gating for AI-assisted summarization.

use std::sync::Arc;

use kintai_domain::Result;
use tracing::debug;

use super::ports::QuotaStore;

/// Snapshot of an identity's quota state for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

impl QuotaStatus {
    /// Whether another AI call may be issued.
    ///
    /// Advisory, not transactional: concurrent requests may overshoot by a
    /// call or two, but once `used` reaches the limit new calls are
    /// rejected.
    pub fn allows_request(&self) -> bool {
        self.used < self.limit
    }
}

/// Per-identity, per-period counter limiting AI-assisted summarization.
pub struct QuotaService {
    store: Arc<dyn QuotaStore>,
    limit: u32,
}

impl QuotaService {
    pub fn new(store: Arc<dyn QuotaStore>, limit: u32) -> Self {
        Self { store, limit }
    }

    /// Current usage against the configured limit.
    pub async fn check(&self, identity: &str, period: &str) -> Result<QuotaStatus> {
        let usage = self.store.usage(identity, period).await?;
        let used = usage.request_count;
        let status =
            QuotaStatus { used, limit: self.limit, remaining: self.limit.saturating_sub(used) };
        debug!(identity, period, used, limit = self.limit, "quota checked");
        Ok(status)
    }

    /// Record one successful AI call. Last-writer-wins increment; the row is
    /// created on first use and never deleted.
    pub async fn record(
        &self,
        identity: &str,
        period: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<()> {
        self.store.record(identity, period, 1, input_tokens, output_tokens).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rejects_at_limit() {
        let status = QuotaStatus { used: 10, limit: 10, remaining: 0 };
        assert!(!status.allows_request());

        let status = QuotaStatus { used: 9, limit: 10, remaining: 1 };
        assert!(status.allows_request());
    }

    #[test]
    fn remaining_saturates_on_overshoot() {
        // Concurrent increments can push `used` past the limit; remaining
        // must not underflow.
        let status = QuotaStatus { used: 12, limit: 10, remaining: 10u32.saturating_sub(12) };
        assert_eq!(status.remaining, 0);
        assert!(!status.allows_request());
    }
}
