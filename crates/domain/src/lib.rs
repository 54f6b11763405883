//! # Kintai Domain
//!
//! Business domain types and models for Kintai.
//!
//! This crate contains:
//! - Domain data types (ActivityRecord, SuggestedEntry, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and the 30-hour workday clock
//!
//! ## Architecture
//! - No dependencies on other Kintai crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export workday clock utilities
pub use utils::workday::{format_clock, workday_date, workday_minutes};
