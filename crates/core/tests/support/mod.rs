//! In-memory mock implementations for core port traits.
//!
//! Provides deterministic substitutes for the quota store and summary model
//! so pipeline tests run without database or network dependencies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kintai_core::{ModelSummary, QuotaStore, SummaryModel};
use kintai_domain::{Result as DomainResult, TokenUsage};

/// In-memory `QuotaStore` with real upsert-increment counters.
#[derive(Default)]
pub struct MemoryQuotaStore {
    rows: Mutex<HashMap<(String, String), TokenUsage>>,
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn usage(&self, identity: &str, period: &str) -> DomainResult<TokenUsage> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&(identity.to_string(), period.to_string()))
            .cloned()
            .unwrap_or_else(|| TokenUsage::empty(identity, period)))
    }

    async fn record(
        &self,
        identity: &str,
        period: &str,
        requests: u32,
        input_tokens: u64,
        output_tokens: u64,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let usage = rows
            .entry((identity.to_string(), period.to_string()))
            .or_insert_with(|| TokenUsage::empty(identity, period));
        usage.request_count += requests;
        usage.input_tokens += input_tokens;
        usage.output_tokens += output_tokens;
        Ok(())
    }
}

/// Summary model that returns a fixed rewrite and counts invocations.
#[derive(Default)]
pub struct CountingModel {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SummaryModel for CountingModel {
    async fn summarize(&self, _summary: &str) -> DomainResult<ModelSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelSummary {
            text: "Feature development".to_string(),
            input_tokens: 100,
            output_tokens: 10,
        })
    }
}
