//! Domain types and models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::workday::format_clock;

// ============================================================================
// Activity Types
// ============================================================================

/// Origin system of an observed event.
///
/// Closed enum with an explicit fallback so categorization stays exhaustive
/// even when an unknown source tag arrives from storage or the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SourceKind {
    Github,
    Other(String),
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Github => "github",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for SourceKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "github" => Self::Github,
            _ => Self::Other(value),
        }
    }
}

impl From<SourceKind> for String {
    fn from(value: SourceKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of observed event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EventKind {
    Commit,
    PullRequest,
    Review,
    IssueComment,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Commit => "commit",
            Self::PullRequest => "pr",
            Self::Review => "review",
            Self::IssueComment => "issue_comment",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "commit" => Self::Commit,
            "pr" => Self::PullRequest,
            "review" => Self::Review,
            "issue_comment" => Self::IssueComment,
            _ => Self::Other(value),
        }
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull request action, ordered by reporting priority.
///
/// The derived `Ord` is the total order used when the same PR title shows up
/// with several actions in one day: `Merged > Closed > Opened`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrAction {
    Opened,
    Closed,
    Merged,
}

impl PrAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "opened" => Some(Self::Opened),
            "closed" => Some(Self::Closed),
            "merged" => Some(Self::Merged),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

impl std::fmt::Display for PrAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed developer activity event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub source: SourceKind,
    pub kind: EventKind,
    /// Workday the event is attributed to, after 30-hour-clock
    /// normalization. Derived from `event_timestamp`, not the UTC date.
    pub event_date: NaiveDate,
    /// Original instant, used for ordering and time-of-day estimation.
    pub event_timestamp: DateTime<Utc>,
    pub repo: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Event-kind-specific payload (commit count, PR action, ...).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ActivityRecord {
    /// Number of commits represented by this record (defaults to 1).
    pub fn commit_count(&self) -> u64 {
        self.metadata.get("count").and_then(serde_json::Value::as_u64).unwrap_or(1)
    }

    /// Pull request action carried in the metadata payload, if any.
    pub fn pr_action(&self) -> Option<PrAction> {
        self.metadata
            .get("action")
            .and_then(serde_json::Value::as_str)
            .and_then(PrAction::parse)
    }

    /// Whether the timestamp carries a real time of day.
    ///
    /// Daily commit aggregates from the provider are date-only; their
    /// timestamps are midnight placeholders and must not feed time-of-day
    /// estimation.
    pub fn has_time_of_day(&self) -> bool {
        !self
            .metadata
            .get("date_only")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

// ============================================================================
// Ownership & ranges
// ============================================================================

/// Organization + user pair owning ledger and credential rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub organization_id: String,
    pub user_id: String,
}

impl Owner {
    pub fn new(organization_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self { organization_id: organization_id.into(), user_id: user_id.into() }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// One proposed timesheet row.
///
/// Start and end are minutes since midnight on the 30-hour scale, so an
/// entry running past midnight formats as hours 24..30 rather than rolling
/// to the next day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedEntry {
    pub work_date: NaiveDate,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub break_minutes: u32,
    pub description: String,
    /// The workday already has a non-empty recorded entry. Informational:
    /// the caller decides whether to apply and replace.
    pub conflicted: bool,
}

impl SuggestedEntry {
    /// Start of day as `HH:MM` (hours 00..29).
    pub fn start_time(&self) -> String {
        format_clock(self.start_minutes)
    }

    /// End of day as `HH:MM` (hours 00..29).
    pub fn end_time(&self) -> String {
        format_clock(self.end_minutes)
    }

    /// Net worked minutes after the break.
    pub fn worked_minutes(&self) -> u32 {
        (self.end_minutes - self.start_minutes).saturating_sub(self.break_minutes)
    }
}

/// Assembled suggestion set for a date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestion {
    pub entries: Vec<SuggestedEntry>,
    /// One-line human-readable summary of what was suggested (or why
    /// nothing was).
    pub reasoning: String,
}

/// A user-entered timesheet row, used only for conflict detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExistingEntry {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: Option<f64>,
}

impl ExistingEntry {
    /// A row counts as recorded when any of start/end/hours is non-empty.
    pub fn has_recorded_time(&self) -> bool {
        let non_empty = |value: &Option<String>| {
            value.as_deref().is_some_and(|text| !text.trim().is_empty())
        };
        non_empty(&self.start_time) || non_empty(&self.end_time) || self.hours.is_some()
    }
}

// ============================================================================
// Quota accounting
// ============================================================================

/// AI usage counters for one identity within one quota period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Identity issuing requests (end-user or anonymous-session id), not the
    /// data owner.
    pub identity: String,
    /// Coarse period bucket, `YYYY-MM`.
    pub period: String,
    pub request_count: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Zeroed usage row for an identity/period that has no history yet.
    pub fn empty(identity: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            period: period.into(),
            request_count: 0,
            input_tokens: 0,
            output_tokens: 0,
        }
    }
}
