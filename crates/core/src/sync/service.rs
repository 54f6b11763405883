//! Activity sync service - fetch, normalize, persist.

use std::sync::Arc;

use kintai_domain::{ActivityRecord, DateRange, KintaiError, Owner, Result, SourceKind};
use tracing::info;

use super::ports::{ActivityGateway, ActivityLedger, CredentialCipher, CredentialStore};

/// Pulls provider activity into the deduplicated ledger.
pub struct SyncService {
    gateway: Arc<dyn ActivityGateway>,
    ledger: Arc<dyn ActivityLedger>,
    credentials: Arc<dyn CredentialStore>,
    cipher: Arc<dyn CredentialCipher>,
}

impl SyncService {
    pub fn new(
        gateway: Arc<dyn ActivityGateway>,
        ledger: Arc<dyn ActivityLedger>,
        credentials: Arc<dyn CredentialStore>,
        cipher: Arc<dyn CredentialCipher>,
    ) -> Self {
        Self { gateway, ledger, credentials, cipher }
    }

    /// Store a provider token for the owner, encrypted at rest.
    pub async fn connect(&self, owner: &Owner, token: &str) -> Result<()> {
        let ciphertext = self.cipher.encrypt(token)?;
        self.credentials.put(owner, &SourceKind::Github, &ciphertext).await
    }

    /// Fetch the owner's activity for the range and persist it.
    ///
    /// Returns the number of newly persisted records; re-running the same
    /// sync is idempotent because the ledger silently skips duplicates.
    pub async fn sync(&self, owner: &Owner, range: DateRange) -> Result<usize> {
        let ciphertext = self
            .credentials
            .get(owner, &SourceKind::Github)
            .await?
            .ok_or_else(|| {
                KintaiError::Config(format!(
                    "no github credential stored for {}/{}",
                    owner.organization_id, owner.user_id
                ))
            })?;
        let token = self.cipher.decrypt(&ciphertext)?;

        let records = self.gateway.fetch_activities(&token, &owner.user_id, range).await?;
        let inserted = self.ledger.insert_batch(owner, &records).await?;

        info!(
            organization = %owner.organization_id,
            user = %owner.user_id,
            fetched = records.len(),
            inserted,
            "activity sync complete"
        );
        Ok(inserted)
    }

    /// Stored records for the owner in the range, ordered by
    /// `(event_date, event_timestamp)`.
    pub async fn list_activities(
        &self,
        owner: &Owner,
        range: DateRange,
    ) -> Result<Vec<ActivityRecord>> {
        self.ledger.find_by_range(owner, range).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use kintai_domain::{EventKind, Result as DomainResult};

    use super::*;

    struct StubGateway(Vec<ActivityRecord>);

    #[async_trait]
    impl ActivityGateway for StubGateway {
        async fn fetch_activities(
            &self,
            _: &str,
            _: &str,
            _: DateRange,
        ) -> DomainResult<Vec<ActivityRecord>> {
            Ok(self.0.clone())
        }
    }

    /// Ledger mock with natural-key dedup, mirroring the SQLite behaviour.
    #[derive(Default)]
    struct InMemoryLedger {
        rows: Mutex<Vec<(Owner, ActivityRecord)>>,
    }

    #[async_trait]
    impl ActivityLedger for InMemoryLedger {
        async fn insert_batch(
            &self,
            owner: &Owner,
            records: &[ActivityRecord],
        ) -> DomainResult<usize> {
            let mut rows = self.rows.lock().unwrap();
            let mut inserted = 0;
            for record in records {
                let duplicate = rows.iter().any(|(o, r)| {
                    o == owner
                        && r.source == record.source
                        && r.kind == record.kind
                        && r.event_timestamp == record.event_timestamp
                        && r.repo == record.repo
                });
                if !duplicate {
                    rows.push((owner.clone(), record.clone()));
                    inserted += 1;
                }
            }
            Ok(inserted)
        }

        async fn find_by_range(
            &self,
            owner: &Owner,
            range: DateRange,
        ) -> DomainResult<Vec<ActivityRecord>> {
            let rows = self.rows.lock().unwrap();
            let mut found: Vec<ActivityRecord> = rows
                .iter()
                .filter(|(o, r)| o == owner && range.contains(r.event_date))
                .map(|(_, r)| r.clone())
                .collect();
            found.sort_by_key(|r| (r.event_date, r.event_timestamp));
            Ok(found)
        }
    }

    struct InMemoryCredentials(Mutex<Option<String>>);

    #[async_trait]
    impl CredentialStore for InMemoryCredentials {
        async fn get(&self, _: &Owner, _: &SourceKind) -> DomainResult<Option<String>> {
            Ok(self.0.lock().unwrap().clone())
        }

        async fn put(&self, _: &Owner, _: &SourceKind, ciphertext: &str) -> DomainResult<()> {
            *self.0.lock().unwrap() = Some(ciphertext.to_string());
            Ok(())
        }
    }

    struct PlainCipher;

    impl CredentialCipher for PlainCipher {
        fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
            Ok(plaintext.to_string())
        }

        fn decrypt(&self, ciphertext: &str) -> DomainResult<String> {
            Ok(ciphertext.to_string())
        }
    }

    fn sample_record() -> ActivityRecord {
        ActivityRecord {
            source: SourceKind::Github,
            kind: EventKind::Commit,
            event_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            event_timestamp: Utc.with_ymd_and_hms(2025, 1, 15, 1, 30, 0).unwrap(),
            repo: Some("app".to_string()),
            title: None,
            url: None,
            metadata: serde_json::Value::Null,
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn repeated_sync_is_idempotent() {
        let service = SyncService::new(
            Arc::new(StubGateway(vec![sample_record()])),
            Arc::new(InMemoryLedger::default()),
            Arc::new(InMemoryCredentials(Mutex::new(None))),
            Arc::new(PlainCipher),
        );
        let owner = Owner::new("org", "alice");
        service.connect(&owner, "token").await.unwrap();

        assert_eq!(service.sync(&owner, range()).await.unwrap(), 1);
        assert_eq!(service.sync(&owner, range()).await.unwrap(), 0);

        let stored = service.list_activities(&owner, range()).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn sync_without_credential_is_a_config_error() {
        let service = SyncService::new(
            Arc::new(StubGateway(Vec::new())),
            Arc::new(InMemoryLedger::default()),
            Arc::new(InMemoryCredentials(Mutex::new(None))),
            Arc::new(PlainCipher),
        );

        let err = service.sync(&Owner::new("org", "alice"), range()).await.unwrap_err();
        assert!(matches!(err, KintaiError::Config(_)));
    }
}
