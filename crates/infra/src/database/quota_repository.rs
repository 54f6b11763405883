//! SQLite-backed AI usage counters.
//!
//! One row per (identity, period). `record` is an atomic upsert-increment:
//! the row is created on first use and counters only ever grow, so the quota
//! check stays advisory but monotonic under concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kintai_core::QuotaStore;
use kintai_domain::{Result as DomainResult, TokenUsage};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::{map_sql_error, DbManager};
use crate::errors::map_join_error;

/// SQLite token-usage repository.
pub struct SqliteQuotaRepository {
    db: Arc<DbManager>,
}

impl SqliteQuotaRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuotaStore for SqliteQuotaRepository {
    async fn usage(&self, identity: &str, period: &str) -> DomainResult<TokenUsage> {
        let db = Arc::clone(&self.db);
        let identity = identity.to_string();
        let period = period.to_string();

        task::spawn_blocking(move || -> DomainResult<TokenUsage> {
            let conn = db.get_connection()?;
            query_usage(&conn, &identity, &period).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record(
        &self,
        identity: &str,
        period: &str,
        requests: u32,
        input_tokens: u64,
        output_tokens: u64,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let identity = identity.to_string();
        let period = period.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_usage(&conn, &identity, &period, requests, input_tokens, output_tokens)
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn upsert_usage(
    conn: &Connection,
    identity: &str,
    period: &str,
    requests: u32,
    input_tokens: u64,
    output_tokens: u64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO token_usage (identity, period, request_count, input_tokens, output_tokens, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (identity, period) DO UPDATE SET
             request_count = request_count + excluded.request_count,
             input_tokens = input_tokens + excluded.input_tokens,
             output_tokens = output_tokens + excluded.output_tokens,
             updated_at = excluded.updated_at",
        params![
            identity,
            period,
            requests,
            input_tokens as i64,
            output_tokens as i64,
            Utc::now().timestamp(),
        ],
    )?;
    Ok(())
}

fn query_usage(conn: &Connection, identity: &str, period: &str) -> rusqlite::Result<TokenUsage> {
    let row = conn
        .query_row(
            "SELECT request_count, input_tokens, output_tokens
             FROM token_usage
             WHERE identity = ?1 AND period = ?2",
            params![identity, period],
            |row| map_usage_row(row, identity, period),
        )
        .optional()?;

    Ok(row.unwrap_or_else(|| TokenUsage::empty(identity, period)))
}

fn map_usage_row(row: &Row<'_>, identity: &str, period: &str) -> rusqlite::Result<TokenUsage> {
    Ok(TokenUsage {
        identity: identity.to_string(),
        period: period.to_string(),
        request_count: row.get(0)?,
        input_tokens: row.get::<_, i64>(1)? as u64,
        output_tokens: row.get::<_, i64>(2)? as u64,
    })
}

// ============================================================================
// Tests
// ============================================================================
