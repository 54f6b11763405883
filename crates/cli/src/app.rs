//! Service wiring for the CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kintai_core::{
    ActivityGateway, CredentialCipher, CredentialStore, DescriptionSummarizer, QuotaService,
    SuggestionAssembler, SuggestionService, SummaryModel, SyncService, WorkdayBucketer,
};
use kintai_domain::{Config, KintaiError, Result, WorkdayConfig};
use kintai_infra::{
    ConfigRepoRouter, CredentialVault, DbManager, GithubGateway, HttpClient, OpenAiSummaryModel,
    SqliteActivityRepository, SqliteCredentialRepository, SqliteQuotaRepository,
};

const ROUTES_FILE: &str = "routes.toml";

/// Fully wired application services.
pub struct App {
    pub sync: SyncService,
    pub suggestions: SuggestionService,
    pub workday: WorkdayConfig,
}

impl App {
    /// Build every service from configuration, running DB migrations.
    pub fn build(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(
            Path::new(&config.database.path),
            config.database.pool_size,
        )?);
        db.run_migrations()?;

        let ledger = Arc::new(SqliteActivityRepository::new(Arc::clone(&db)));
        let credentials = Arc::new(SqliteCredentialRepository::new(Arc::clone(&db)));
        let quota_store = Arc::new(SqliteQuotaRepository::new(Arc::clone(&db)));

        let vault_key = config.database.vault_key.as_deref().ok_or_else(|| {
            KintaiError::Config(
                "no credential vault key configured; set KINTAI_VAULT_KEY or run \
                 `kintai generate-key`"
                    .to_string(),
            )
        })?;
        let cipher = Arc::new(CredentialVault::from_hex_key(vault_key)?);

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.ai.timeout_secs.max(30)))
            .user_agent("kintai")
            .build()?;

        let gateway = Arc::new(GithubGateway::new(
            http.clone(),
            config.github.api_url.clone(),
            config.workday.offset(),
        ));

        let model: Option<Arc<dyn SummaryModel>> = config.ai.api_key.clone().map(|key| {
            Arc::new(OpenAiSummaryModel::new(key, config.ai.model.clone(), http.clone()))
                as Arc<dyn SummaryModel>
        });
        let quota = Arc::new(QuotaService::new(quota_store, config.ai.monthly_request_limit));
        let summarizer = Arc::new(DescriptionSummarizer::new(
            model,
            quota,
            Duration::from_secs(config.ai.timeout_secs),
        ));

        let bucketer = WorkdayBucketer::new(&config.workday);
        let assembler = SuggestionAssembler::new(bucketer, summarizer);

        let routes_path = Path::new(ROUTES_FILE);
        let router = Arc::new(if routes_path.exists() {
            ConfigRepoRouter::from_file(routes_path)?
        } else {
            ConfigRepoRouter::default()
        });

        let sync = SyncService::new(
            Arc::clone(&gateway) as Arc<dyn ActivityGateway>,
            ledger,
            Arc::clone(&credentials) as Arc<dyn CredentialStore>,
            Arc::clone(&cipher) as Arc<dyn CredentialCipher>,
        );
        let suggestions = SuggestionService::new(assembler, gateway, credentials, cipher, router);

        Ok(Self { sync, suggestions, workday: config.workday })
    }
}
