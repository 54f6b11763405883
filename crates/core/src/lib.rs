//! # Kintai Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Workday bucketing and suggestion assembly
//! - Port/adapter interfaces (traits)
//! - Quota gating and description summarization
//!
//! ## Architecture Principles
//! - Only depends on `kintai-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod suggestion;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use suggestion::assembler::{ExistingEntries, SuggestionAssembler, SuggestionService};
pub use suggestion::bucketer::{DayWindow, WorkdayBucketer};
pub use suggestion::ports::{ModelSummary, QuotaStore, RepoRouter, SummaryModel};
pub use suggestion::quota::{QuotaService, QuotaStatus};
pub use suggestion::summarizer::{DescriptionSummarizer, SummaryResult};
pub use sync::ports::{ActivityGateway, ActivityLedger, CredentialCipher, CredentialStore};
pub use sync::SyncService;
