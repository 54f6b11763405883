//! SQLite-backed activity ledger.
//!
//! Implements the async `ActivityLedger` port. Inserts are deduplicated at
//! the natural-key level (owner + source + kind + timestamp + repo): a
//! uniqueness violation from a repeated sync is silently skipped, and the
//! returned count covers only the rows actually persisted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use kintai_core::ActivityLedger;
use kintai_domain::{ActivityRecord, DateRange, Owner, Result as DomainResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::{map_sql_error, DbManager};
use crate::errors::{is_unique_violation, map_join_error};

/// SQLite activity ledger repository.
pub struct SqliteActivityRepository {
    db: Arc<DbManager>,
}

impl SqliteActivityRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityLedger for SqliteActivityRepository {
    async fn insert_batch(
        &self,
        owner: &Owner,
        records: &[ActivityRecord],
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let owner = owner.clone();
        let records = records.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            let mut inserted = 0;
            for record in &records {
                if insert_record(&conn, &owner, record).map_err(map_sql_error)? {
                    inserted += 1;
                }
            }
            debug!(total = records.len(), inserted, "activity batch stored");
            Ok(inserted)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_range(
        &self,
        owner: &Owner,
        range: DateRange,
    ) -> DomainResult<Vec<ActivityRecord>> {
        let db = Arc::clone(&self.db);
        let owner = owner.clone();

        task::spawn_blocking(move || -> DomainResult<Vec<ActivityRecord>> {
            let conn = db.get_connection()?;
            query_records(&conn, &owner, range).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

const INSERT_ACTIVITY_SQL: &str = "INSERT INTO activities (
        id, organization_id, user_id, source, kind, event_date,
        event_timestamp, repo, title, url, metadata_json, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

const SELECT_ACTIVITIES_SQL: &str = "SELECT source, kind, event_date, event_timestamp,
        repo, title, url, metadata_json
    FROM activities
    WHERE organization_id = ?1 AND user_id = ?2
      AND event_date >= ?3 AND event_date <= ?4
    ORDER BY event_date ASC, event_timestamp ASC";

/// Insert one record; `Ok(false)` means the natural key already existed.
fn insert_record(
    conn: &Connection,
    owner: &Owner,
    record: &ActivityRecord,
) -> rusqlite::Result<bool> {
    let metadata_json = if record.metadata.is_null() {
        None
    } else {
        Some(record.metadata.to_string())
    };

    let outcome = conn.execute(
        INSERT_ACTIVITY_SQL,
        params![
            Uuid::new_v4().to_string(),
            owner.organization_id,
            owner.user_id,
            record.source.as_str(),
            record.kind.as_str(),
            record.event_date.to_string(),
            record.event_timestamp.timestamp(),
            record.repo,
            record.title,
            record.url,
            metadata_json,
            Utc::now().timestamp(),
        ],
    );

    match outcome {
        Ok(_) => Ok(true),
        Err(err) if is_unique_violation(&err) => Ok(false),
        Err(err) => Err(err),
    }
}

fn query_records(
    conn: &Connection,
    owner: &Owner,
    range: DateRange,
) -> rusqlite::Result<Vec<ActivityRecord>> {
    let mut stmt = conn.prepare(SELECT_ACTIVITIES_SQL)?;
    let rows = stmt.query_map(
        params![
            owner.organization_id,
            owner.user_id,
            range.start.to_string(),
            range.end.to_string()
        ],
        map_activity_row,
    )?;
    rows.collect()
}

fn map_activity_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let source: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let event_date: String = row.get(2)?;
    let event_timestamp: i64 = row.get(3)?;
    let metadata_json: Option<String> = row.get(7)?;

    let event_date = NaiveDate::parse_from_str(&event_date, "%Y-%m-%d")
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?;
    let event_timestamp: DateTime<Utc> =
        Utc.timestamp_opt(event_timestamp, 0).single().ok_or_else(|| {
            rusqlite::Error::IntegralValueOutOfRange(3, event_timestamp)
        })?;
    let metadata = match metadata_json {
        Some(text) => serde_json::from_str(&text).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(err))
        })?,
        None => serde_json::Value::Null,
    };

    Ok(ActivityRecord {
        source: source.into(),
        kind: kind.into(),
        event_date,
        event_timestamp,
        repo: row.get(4)?,
        title: row.get(5)?,
        url: row.get(6)?,
        metadata,
    })
}

// ============================================================================
// Tests
// ============================================================================
