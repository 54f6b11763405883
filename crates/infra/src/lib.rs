//! # Kintai Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite)
//! - HTTP client implementations
//! - External service integrations (GitHub, OpenAI)
//! - The credential vault
//!
//! ## Architecture
//! - Implements traits defined in `kintai-core`
//! - Depends on `kintai-domain` and `kintai-core`
//! - Contains all "impure" code (I/O, external APIs)

pub mod config;
pub mod crypto;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod router;

// Re-export commonly used items
pub use crypto::CredentialVault;
pub use database::{
    DbManager, SqliteActivityRepository, SqliteCredentialRepository, SqliteQuotaRepository,
};
pub use http::HttpClient;
pub use integrations::github::GithubGateway;
pub use integrations::openai::OpenAiSummaryModel;
pub use router::ConfigRepoRouter;
