//! Subcommand implementations.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{Days, NaiveDate, Utc};
use kintai_core::ExistingEntries;
use kintai_domain::{DateRange, ExistingEntry, KintaiError, Result, WorkdayConfig};
use kintai_infra::CredentialVault;
use tracing::debug;

use crate::app::App;
use crate::{Command, IdentityArgs};

pub async fn run(command: Command) -> Result<()> {
    if let Command::GenerateKey = command {
        println!("{}", CredentialVault::generate_key());
        return Ok(());
    }

    let config = kintai_infra::config::load()?;
    let app = App::build(config)?;

    match command {
        Command::Connect { identity, token } => connect(&app, identity, token).await,
        Command::Sync { identity, month } => sync(&app, identity, month).await,
        Command::Activities { identity, month } => activities(&app, identity, &month).await,
        Command::Suggest { identity, month, client, existing } => {
            suggest(&app, identity, &month, client.as_deref(), existing).await
        }
        Command::GenerateKey => unreachable!("handled above"),
    }
}

async fn connect(app: &App, identity: IdentityArgs, token: String) -> Result<()> {
    let owner = identity.resolve()?;
    app.sync.connect(&owner, &token).await?;
    println!("GitHub connected for {}/{}", owner.organization_id, owner.user_id);
    Ok(())
}

async fn sync(app: &App, identity: IdentityArgs, month: Option<String>) -> Result<()> {
    let owner = identity.resolve()?;
    let range = match month {
        Some(month) => month_range(&month)?,
        None => trailing_week(&app.workday),
    };
    debug!(start = %range.start, end = %range.end, "sync range");

    let inserted = app.sync.sync(&owner, range).await?;
    println!("{inserted} new activities");
    Ok(())
}

async fn activities(app: &App, identity: IdentityArgs, month: &str) -> Result<()> {
    let owner = identity.resolve()?;
    let range = month_range(month)?;

    let records = app.sync.list_activities(&owner, range).await?;
    for record in &records {
        println!(
            "{} {:>13} {:<14} {}",
            record.event_date,
            record.kind.as_str(),
            record.repo.as_deref().unwrap_or("-"),
            record.title.as_deref().unwrap_or("-"),
        );
    }
    println!("{} activities", records.len());
    Ok(())
}

async fn suggest(
    app: &App,
    identity: IdentityArgs,
    month: &str,
    client: Option<&str>,
    existing: Option<PathBuf>,
) -> Result<()> {
    let owner = identity.resolve()?;
    let range = month_range(month)?;
    let existing = match existing {
        Some(path) => load_existing_entries(&path)?,
        None => ExistingEntries::new(),
    };

    // Quota is charged to whoever issues the request, in the month the
    // request is issued, regardless of which data owner or month is queried.
    let quota_identity = quota_identity();
    let quota_period = quota_period(&app.workday);
    let suggestion = app
        .suggestions
        .suggest_for_range(&owner, client, range, &existing, &quota_identity, &quota_period)
        .await;

    for entry in &suggestion.entries {
        let conflict = if entry.conflicted { "  [conflicts with existing entry]" } else { "" };
        println!(
            "{} {}-{} break {:>2}m  {}{}",
            entry.work_date,
            entry.start_time(),
            entry.end_time(),
            entry.break_minutes,
            entry.description,
            conflict,
        );
    }
    println!("{}", suggestion.reasoning);
    Ok(())
}

/// Identity charged for AI usage: the invoking user, not the data owner.
fn quota_identity() -> String {
    identity_from(std::env::var("USER").ok())
}

fn identity_from(user: Option<String>) -> String {
    user.filter(|name| !name.trim().is_empty()).unwrap_or_else(|| "anonymous".to_string())
}

/// Quota period bucket for right now, `YYYY-MM` in local workday time.
fn quota_period(workday: &WorkdayConfig) -> String {
    Utc::now().with_timezone(&workday.offset()).format("%Y-%m").to_string()
}

/// Parse a `YYYY-MM` month into an inclusive first..last date range.
fn month_range(month: &str) -> Result<DateRange> {
    let invalid = || KintaiError::InvalidInput(format!("invalid month (expected YYYY-MM): {month}"));

    let (year, month_num) = month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month_num: u32 = month_num.parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, month_num, 1).ok_or_else(invalid)?;
    let next_month = if month_num == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month_num + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next_month.pred_opt().ok_or_else(invalid)?;

    Ok(DateRange::new(start, end))
}

/// Trailing 7-day range ending on today's local workday.
fn trailing_week(workday: &WorkdayConfig) -> DateRange {
    let today = Utc::now().with_timezone(&workday.offset()).date_naive();
    let start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    DateRange::new(start, today)
}

/// Load existing timesheet entries from a JSON map of `date -> entry`.
fn load_existing_entries(path: &std::path::Path) -> Result<ExistingEntries> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| KintaiError::InvalidInput(format!("failed to read entries file: {e}")))?;
    let raw: HashMap<NaiveDate, ExistingEntry> = serde_json::from_str(&contents)
        .map_err(|e| KintaiError::InvalidInput(format!("invalid entries file: {e}")))?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_covers_whole_month() {
        let range = month_range("2025-01").unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let range = month_range("2024-12").unwrap();
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn february_handles_leap_years() {
        assert_eq!(
            month_range("2024-02").unwrap().end,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            month_range("2025-02").unwrap().end,
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn malformed_month_is_invalid_input() {
        for bad in ["2025", "2025-13", "jan-2025", "2025-00"] {
            assert!(
                matches!(month_range(bad), Err(KintaiError::InvalidInput(_))),
                "expected rejection for {bad}"
            );
        }
    }

    #[test]
    fn quota_identity_falls_back_to_anonymous() {
        assert_eq!(identity_from(Some("alice".to_string())), "alice");
        assert_eq!(identity_from(Some("  ".to_string())), "anonymous");
        assert_eq!(identity_from(None), "anonymous");
    }

    #[test]
    fn quota_period_is_a_valid_month_key() {
        let period = quota_period(&WorkdayConfig::default());
        assert!(month_range(&period).is_ok(), "not a YYYY-MM key: {period}");
    }

    #[test]
    fn trailing_week_spans_seven_days() {
        let range = trailing_week(&WorkdayConfig::default());
        assert_eq!(range.end.signed_duration_since(range.start).num_days(), 6);
    }
}
