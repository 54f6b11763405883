//! Port interfaces for activity ingestion
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use kintai_domain::{ActivityRecord, DateRange, Owner, Result, SourceKind};

/// Trait for fetching raw activity from an external provider.
///
/// Implementations hide provider-specific pagination; results are bounded by
/// the requested date range and already normalized onto the 30-hour workday
/// clock.
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Fetch activity for a provider login within a date range.
    async fn fetch_activities(
        &self,
        token: &str,
        login: &str,
        range: DateRange,
    ) -> Result<Vec<ActivityRecord>>;
}

/// Trait for the deduplicated append-only activity store.
#[async_trait]
pub trait ActivityLedger: Send + Sync {
    /// Insert a batch of records, skipping natural-key duplicates.
    ///
    /// Returns the number of records actually persisted; duplicates from
    /// repeated syncs are expected and harmless, never an error.
    async fn insert_batch(&self, owner: &Owner, records: &[ActivityRecord]) -> Result<usize>;

    /// Stored records for an owner within a date range, ordered by
    /// `(event_date, event_timestamp)` ascending. Downstream bucketing
    /// relies on this ordering.
    async fn find_by_range(&self, owner: &Owner, range: DateRange)
        -> Result<Vec<ActivityRecord>>;
}

/// Trait for persisting one encrypted credential per (owner, source).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored ciphertext for the owner and source, if any.
    async fn get(&self, owner: &Owner, source: &SourceKind) -> Result<Option<String>>;

    /// Upsert the ciphertext for the owner and source.
    async fn put(&self, owner: &Owner, source: &SourceKind, ciphertext: &str) -> Result<()>;
}

/// Symmetric credential encryption.
///
/// Decryption of a tampered or incompatible payload fails with
/// `KintaiError::Credential` so callers can prompt for re-authentication
/// instead of showing a generic error.
pub trait CredentialCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}
