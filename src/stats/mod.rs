//! Windowed focus statistics and the consecutive-day streak.
//!
//! The database supplies raw rows; everything derived (totals, rates, the
//! streak walk) is computed here in pure functions so the math is testable
//! without storage.

use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::db::{
    helpers::{local_day_bounds, local_today},
    models::{FocusSession, FocusStats, SessionType},
    Database,
};
use crate::error::Result;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Upper bound on the backward streak scan; guarantees termination.
pub const STREAK_LOOKBACK_DAYS: u32 = 365;

/// Compute a user's statistics over a trailing window (default 7 days).
/// A user with zero sessions in the window gets the all-zero record.
pub async fn compute(
    db: &Database,
    user_id: Uuid,
    window_days: Option<u32>,
) -> Result<FocusStats> {
    let window = window_days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1);
    let cutoff = Utc::now() - Duration::days(i64::from(window));

    let sessions = db.sessions_created_since(user_id, cutoff).await?;
    if sessions.is_empty() {
        return Ok(FocusStats::default());
    }

    let total_distractions = db.count_distractions_since(user_id, cutoff).await?;

    let today = local_today();
    let oldest_day = today - Duration::days(i64::from(STREAK_LOOKBACK_DAYS) - 1);
    let (lookback_start, _) = local_day_bounds(oldest_day);
    let starts = db
        .completed_session_starts_since(user_id, lookback_start)
        .await?;
    let completed_days: HashSet<NaiveDate> = starts
        .iter()
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .collect();
    let streak = current_streak(&completed_days, today);

    Ok(aggregate(&sessions, total_distractions, streak))
}

/// Fold a window of sessions into the stats record.
pub fn aggregate(
    sessions: &[FocusSession],
    total_distractions: u32,
    current_streak: u32,
) -> FocusStats {
    let total_sessions = sessions.len() as u32;
    let completed: Vec<&FocusSession> = sessions.iter().filter(|s| s.is_completed).collect();
    let completed_sessions = completed.len() as u32;

    // Break sessions never count toward focus time.
    let total_focus_minutes: u32 = completed
        .iter()
        .filter(|s| s.session_type == SessionType::Focus)
        .map(|s| s.focus_minutes())
        .sum();

    let average_session_duration = if completed_sessions > 0 {
        round2(f64::from(total_focus_minutes) / f64::from(completed_sessions))
    } else {
        0.0
    };
    let completion_rate = if total_sessions > 0 {
        round2(f64::from(completed_sessions) / f64::from(total_sessions) * 100.0)
    } else {
        0.0
    };

    FocusStats {
        total_sessions,
        completed_sessions,
        total_focus_minutes,
        total_distractions,
        average_session_duration,
        completion_rate,
        current_streak,
    }
}

/// Walk backward from `today`, one calendar day at a time, counting days
/// with at least one completed session. The first gap stops the walk, so a
/// day-0 gap yields 0 even when yesterday qualifies.
pub fn current_streak(completed_days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(i64::from(offset));
        if completed_days.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn day(offset: i64) -> NaiveDate {
        local_today() - Duration::days(offset)
    }

    fn make_session(
        session_type: SessionType,
        completed: bool,
        actual_duration: Option<u32>,
    ) -> FocusSession {
        let now: DateTime<Utc> = Utc::now();
        FocusSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            duration_minutes: 25,
            session_type,
            break_duration_minutes: None,
            started_at: now,
            ended_at: completed.then_some(now),
            is_completed: completed,
            actual_duration,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn streak_counts_contiguous_days() {
        let days: HashSet<NaiveDate> = [day(0), day(1), day(2)].into_iter().collect();
        assert_eq!(current_streak(&days, local_today()), 3);
    }

    #[test]
    fn streak_gap_today_halts_immediately() {
        let days: HashSet<NaiveDate> = [day(1), day(2)].into_iter().collect();
        assert_eq!(current_streak(&days, local_today()), 0);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        // Days 0..=2 qualify, day 3 is a gap, day 4 qualifies again.
        let days: HashSet<NaiveDate> = [day(0), day(1), day(2), day(4)].into_iter().collect();
        assert_eq!(current_streak(&days, local_today()), 3);
    }

    #[test]
    fn streak_is_bounded() {
        let days: HashSet<NaiveDate> = (0..500).map(day).collect();
        assert_eq!(current_streak(&days, local_today()), STREAK_LOOKBACK_DAYS);
    }

    #[test]
    fn aggregate_of_nothing_is_zeroed() {
        let stats = aggregate(&[], 0, 0);
        assert_eq!(stats, FocusStats::default());
    }

    #[test]
    fn aggregate_mixed_window() {
        // 4 sessions: 3 completed focus (25, 30, 20 actual minutes), 1 active.
        let sessions = vec![
            make_session(SessionType::Focus, true, Some(25)),
            make_session(SessionType::Focus, true, Some(30)),
            make_session(SessionType::Focus, true, Some(20)),
            make_session(SessionType::Focus, false, None),
        ];

        let stats = aggregate(&sessions, 5, 2);
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.completed_sessions, 3);
        assert_eq!(stats.total_focus_minutes, 75);
        assert_eq!(stats.total_distractions, 5);
        assert_eq!(stats.average_session_duration, 25.0);
        assert_eq!(stats.completion_rate, 75.0);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn aggregate_excludes_breaks_from_focus_minutes() {
        let sessions = vec![
            make_session(SessionType::Focus, true, Some(25)),
            make_session(SessionType::Break, true, Some(5)),
            make_session(SessionType::LongBreak, true, Some(15)),
        ];

        let stats = aggregate(&sessions, 0, 0);
        assert_eq!(stats.completed_sessions, 3);
        assert_eq!(stats.total_focus_minutes, 25);
    }

    #[test]
    fn aggregate_falls_back_to_planned_duration() {
        let stats = aggregate(&[make_session(SessionType::Focus, true, None)], 0, 0);
        assert_eq!(stats.total_focus_minutes, 25);
    }

    #[test]
    fn rates_round_to_two_places() {
        let sessions = vec![
            make_session(SessionType::Focus, true, Some(10)),
            make_session(SessionType::Focus, true, Some(10)),
            make_session(SessionType::Focus, true, Some(5)),
        ];
        let stats = aggregate(&sessions, 0, 0);
        // 25 / 3 = 8.333... -> 8.33
        assert_eq!(stats.average_session_duration, 8.33);
        assert_eq!(stats.completion_rate, 100.0);
    }
}
