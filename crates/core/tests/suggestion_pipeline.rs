//! Integration tests for the suggestion pipeline with in-memory ports.

mod support;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use kintai_core::{
    DescriptionSummarizer, QuotaService, QuotaStore, SuggestionAssembler, WorkdayBucketer,
};
use kintai_domain::{ActivityRecord, EventKind, SourceKind, WorkdayConfig};
use support::{CountingModel, MemoryQuotaStore};

fn commit_on(day: u32, hour_utc: u32) -> ActivityRecord {
    let ts = Utc.with_ymd_and_hms(2025, 1, day, hour_utc, 0, 0).unwrap();
    let offset = WorkdayConfig::default().offset();
    ActivityRecord {
        source: SourceKind::Github,
        kind: EventKind::Commit,
        event_date: kintai_domain::workday_date(ts, offset),
        event_timestamp: ts,
        repo: Some("app".to_string()),
        title: None,
        url: None,
        metadata: serde_json::Value::Null,
    }
}

fn assembler_with(
    model: Arc<CountingModel>,
    quota_store: Arc<MemoryQuotaStore>,
    limit: u32,
) -> SuggestionAssembler {
    let quota = Arc::new(QuotaService::new(quota_store, limit));
    let summarizer =
        Arc::new(DescriptionSummarizer::new(Some(model), quota, Duration::from_secs(5)));
    SuggestionAssembler::new(WorkdayBucketer::new(&WorkdayConfig::default()), summarizer)
}

#[tokio::test(flavor = "multi_thread")]
async fn multi_day_entries_come_back_date_sorted() {
    let model = Arc::new(CountingModel::default());
    let store = Arc::new(MemoryQuotaStore::default());
    let assembler = assembler_with(Arc::clone(&model), Arc::clone(&store), 100);

    // Three separate workdays, deliberately out of order
    let activities = vec![commit_on(17, 2), commit_on(15, 2), commit_on(16, 2)];
    let suggestion = assembler.suggest(activities, &HashMap::new(), "user-1", "2025-01").await;

    let dates: Vec<NaiveDate> = suggestion.entries.iter().map(|e| e.work_date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        ]
    );
    // One model call per bucket, fanned out concurrently
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn quota_counters_accumulate_per_model_call() {
    let model = Arc::new(CountingModel::default());
    let store = Arc::new(MemoryQuotaStore::default());
    let assembler = assembler_with(model, Arc::clone(&store), 100);

    let activities = vec![commit_on(15, 2), commit_on(16, 2)];
    assembler.suggest(activities, &HashMap::new(), "user-1", "2025-01").await;

    let usage = store.usage("user-1", "2025-01").await.unwrap();
    assert!(usage.request_count >= 2);
    assert!(usage.input_tokens >= 200);
    assert!(usage.output_tokens >= 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_quota_stops_new_model_calls() {
    let model = Arc::new(CountingModel::default());
    let store = Arc::new(MemoryQuotaStore::default());
    store.record("user-1", "2025-01", 5, 500, 50).await.unwrap();

    let assembler = assembler_with(Arc::clone(&model), store, 5);
    let suggestion = assembler
        .suggest(vec![commit_on(15, 2)], &HashMap::new(), "user-1", "2025-01")
        .await;

    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(suggestion.entries[0].description, "app: 1commits");
}
