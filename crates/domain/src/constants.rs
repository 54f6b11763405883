//! Domain constants for the 30-hour workday convention and quota defaults.

/// Hour at which a workday begins. Local times before this hour belong to the
/// previous workday (expressed as hours 24..30 on the 30-hour clock).
pub const WORKDAY_START_HOUR: u32 = 6;

/// Earliest minute a suggested entry may start (06:00 on the 30-hour scale).
pub const WORKDAY_FLOOR_MINUTES: u32 = WORKDAY_START_HOUR * 60;

/// Latest minute a suggested entry may end (29:59 on the 30-hour scale).
pub const WORKDAY_CEILING_MINUTES: u32 = 29 * 60 + 59;

/// Minutes added to the end time when a day's activity collapses to a single
/// instant (end would otherwise not exceed start).
pub const DEGENERATE_WINDOW_BUMP_MINUTES: u32 = 60;

/// A window at least this long gets a lunch break.
pub const BREAK_THRESHOLD_MINUTES: u32 = 360;

/// Break length applied once the threshold is met.
pub const BREAK_MINUTES: u32 = 60;

/// Default fallback window start when a day has no timestamped activity
/// (09:00).
pub const DEFAULT_FALLBACK_START_MINUTES: u32 = 9 * 60;

/// Default fallback window end when a day has no timestamped activity
/// (18:00).
pub const DEFAULT_FALLBACK_END_MINUTES: u32 = 18 * 60;

/// Default number of AI summarization requests allowed per identity per
/// month.
pub const DEFAULT_MONTHLY_REQUEST_LIMIT: u32 = 100;

/// Default local offset from UTC in hours (JST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Maximum number of PR titles kept in a deterministic day summary.
pub const SUMMARY_MAX_PR_TITLES: usize = 3;

/// Placeholder description when a day has no categorizable activity.
pub const SUMMARY_PLACEHOLDER: &str = "general work";
