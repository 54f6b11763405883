//! Activity ingestion: provider fetch plus deduplicated persistence.

pub mod ports;
pub mod service;

pub use service::SyncService;
