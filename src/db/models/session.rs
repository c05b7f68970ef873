use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Distraction;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    Break,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::Break => "break",
            SessionType::LongBreak => "long_break",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "focus" => Some(SessionType::Focus),
            "break" => Some(SessionType::Break),
            "long_break" => Some(SessionType::LongBreak),
            _ => None,
        }
    }
}

impl Default for SessionType {
    fn default() -> Self {
        SessionType::Focus
    }
}

/// A focus session row. At most one per user may have `is_completed = false`;
/// cancelled sessions are deleted outright and never reach a terminal flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub duration_minutes: u32,
    pub session_type: SessionType,
    pub break_duration_minutes: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub actual_duration: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FocusSession {
    /// Whether this session still counts as the user's active session.
    pub fn is_active(&self) -> bool {
        !self.is_completed
    }

    /// Focus minutes this session contributes to aggregate totals: the
    /// recorded actual duration, falling back to the planned length.
    pub fn focus_minutes(&self) -> u32 {
        self.actual_duration.unwrap_or(self.duration_minutes)
    }
}

/// A session augmented with its distraction log, as returned by the
/// active/history/today views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithDistractions {
    #[serde(flatten)]
    pub session: FocusSession,
    pub distractions: Vec<Distraction>,
}
