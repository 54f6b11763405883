//! Timesheet suggestion pipeline: bucketing, summarization, assembly.

pub mod assembler;
pub mod bucketer;
pub mod ports;
pub mod quota;
pub mod summarizer;

pub use assembler::{ExistingEntries, SuggestionAssembler, SuggestionService};
pub use bucketer::{DayWindow, WorkdayBucketer};
pub use quota::{QuotaService, QuotaStatus};
pub use summarizer::{DescriptionSummarizer, SummaryResult};
