//! Workday bucketing and time-window derivation.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use kintai_domain::constants::{
    BREAK_MINUTES, BREAK_THRESHOLD_MINUTES, DEGENERATE_WINDOW_BUMP_MINUTES,
    WORKDAY_CEILING_MINUTES, WORKDAY_FLOOR_MINUTES,
};
use kintai_domain::{workday_minutes, ActivityRecord, WorkdayConfig};

/// Derived time window for one workday bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub break_minutes: u32,
}

/// Groups activity records into 30-hour-clock workdays and derives
/// start/end/break heuristics per day.
pub struct WorkdayBucketer {
    offset: FixedOffset,
    fallback_start_minutes: u32,
    fallback_end_minutes: u32,
}

impl WorkdayBucketer {
    pub fn new(config: &WorkdayConfig) -> Self {
        Self {
            offset: config.offset(),
            fallback_start_minutes: config.fallback_start_minutes,
            fallback_end_minutes: config.fallback_end_minutes,
        }
    }

    /// Group records by workday. `BTreeMap` keeps the dates ascending.
    pub fn bucket(&self, records: Vec<ActivityRecord>) -> BTreeMap<NaiveDate, Vec<ActivityRecord>> {
        let mut buckets: BTreeMap<NaiveDate, Vec<ActivityRecord>> = BTreeMap::new();
        for record in records {
            buckets.entry(record.event_date).or_default().push(record);
        }
        buckets
    }

    /// Derive the suggested time window for one day's records.
    ///
    /// Timestamped records are projected onto the 30-hour scale and clamped
    /// into 06:00..=29:59; a collapsed window gets a one-hour bump so the
    /// entry never degenerates to zero duration. The bump never pushes the
    /// end past 29:59; a window collapsed against the ceiling pulls its
    /// start back instead. Days with only date-level records fall back to
    /// the configured default window.
    pub fn window(&self, records: &[ActivityRecord]) -> DayWindow {
        let minutes: Vec<u32> = records
            .iter()
            .filter(|record| record.has_time_of_day())
            .map(|record| workday_minutes(record.event_timestamp, self.offset))
            .collect();

        let (start, end) = match (minutes.iter().min(), minutes.iter().max()) {
            (Some(&earliest), Some(&latest)) => {
                let mut start = earliest.max(WORKDAY_FLOOR_MINUTES);
                let mut end = latest.min(WORKDAY_CEILING_MINUTES);
                if end <= start {
                    end = (start + DEGENERATE_WINDOW_BUMP_MINUTES).min(WORKDAY_CEILING_MINUTES);
                    if end <= start {
                        start = end - DEGENERATE_WINDOW_BUMP_MINUTES;
                    }
                }
                (start, end)
            }
            _ => (self.fallback_start_minutes, self.fallback_end_minutes),
        };

        DayWindow { start_minutes: start, end_minutes: end, break_minutes: break_for(start, end) }
    }
}

/// Lunch-break heuristic: only full working days get a break.
fn break_for(start: u32, end: u32) -> u32 {
    if end.saturating_sub(start) >= BREAK_THRESHOLD_MINUTES {
        BREAK_MINUTES
    } else {
        0
    }
}
