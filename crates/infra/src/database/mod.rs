//! Database implementations

pub mod activity_repository;
pub mod credential_repository;
pub mod manager;
pub mod quota_repository;

pub use activity_repository::SqliteActivityRepository;
pub use credential_repository::SqliteCredentialRepository;
pub use manager::{DbConnection, DbManager};
pub use quota_repository::SqliteQuotaRepository;
