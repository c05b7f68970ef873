use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::db::models::SessionType;

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

pub fn to_optional_u32(value: Option<i64>, field: &str) -> Result<Option<u32>> {
    value.map(|raw| to_u32(raw, field)).transpose()
}

pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("failed to parse {field}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_session_type(value: &str) -> Result<SessionType> {
    SessionType::from_str(value).ok_or_else(|| anyhow!("unknown session type {value}"))
}

/// Today according to the server's local clock. Calendar-day semantics (the
/// today view, the streak walk) key off this date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// UTC bounds of a local calendar day as a half-open interval
/// `[start, next_day_start)`.
pub fn local_day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_day_start(day);
    let end = day
        .succ_opt()
        .map(local_day_start)
        .unwrap_or_else(|| start + chrono::Duration::days(1));
    (start, end)
}

fn local_day_start(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // local midnight skipped by a DST transition
        None => Utc.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn day_bounds_are_half_open() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let (start, end) = local_day_bounds(day);
        assert_eq!(end - start, Duration::days(1));

        // 23:59:59 falls inside the day, the next midnight does not.
        let last_second = end - Duration::seconds(1);
        assert!(last_second >= start && last_second < end);
    }

    #[test]
    fn consecutive_days_share_a_boundary() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let (_, end) = local_day_bounds(day);
        let (next_start, _) = local_day_bounds(day.succ_opt().unwrap());
        assert_eq!(end, next_start);
    }

    #[test]
    fn datetime_roundtrip() {
        let now = Utc::now();
        let parsed = parse_datetime(&now.to_rfc3339(), "started_at").unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn rejects_garbage_datetime() {
        assert!(parse_datetime("not-a-date", "started_at").is_err());
    }
}
