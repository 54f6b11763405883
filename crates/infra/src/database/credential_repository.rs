//! SQLite-backed encrypted credential store.
//!
//! Holds exactly one ciphertext per (owner, source); storing again replaces
//! the previous credential. Plaintext never reaches this layer - encryption
//! happens in the vault before the token is handed over.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kintai_core::CredentialStore;
use kintai_domain::{Owner, Result as DomainResult, SourceKind};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::manager::{map_sql_error, DbManager};
use crate::errors::map_join_error;

/// SQLite credential repository.
pub struct SqliteCredentialRepository {
    db: Arc<DbManager>,
}

impl SqliteCredentialRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialRepository {
    async fn get(&self, owner: &Owner, source: &SourceKind) -> DomainResult<Option<String>> {
        let db = Arc::clone(&self.db);
        let owner = owner.clone();
        let source = source.as_str().to_string();

        task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let conn = db.get_connection()?;
            query_credential(&conn, &owner, &source).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn put(&self, owner: &Owner, source: &SourceKind, ciphertext: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let owner = owner.clone();
        let source = source.as_str().to_string();
        let ciphertext = ciphertext.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_credential(&conn, &owner, &source, &ciphertext).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn upsert_credential(
    conn: &Connection,
    owner: &Owner,
    source: &str,
    ciphertext: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO credentials (organization_id, user_id, source, ciphertext, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (organization_id, user_id, source) DO UPDATE SET
             ciphertext = excluded.ciphertext,
             updated_at = excluded.updated_at",
        params![
            owner.organization_id,
            owner.user_id,
            source,
            ciphertext,
            Utc::now().timestamp(),
        ],
    )?;
    Ok(())
}

fn query_credential(
    conn: &Connection,
    owner: &Owner,
    source: &str,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT ciphertext FROM credentials
         WHERE organization_id = ?1 AND user_id = ?2 AND source = ?3",
        params![owner.organization_id, owner.user_id, source],
        |row| row.get(0),
    )
    .optional()
}

// ============================================================================
// Tests
// ============================================================================
