use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::SessionType;
use crate::error::{Error, Result};

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 180;
pub const MAX_BREAK_MINUTES: u32 = 60;
/// Ceiling for a client-supplied actual duration on completion.
pub const MAX_ACTUAL_MINUTES: u32 = 1440;
pub const MAX_DISTRACTION_NAME_LEN: usize = 100;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 100;

fn default_duration() -> u32 {
    25
}

/// Parameters for starting a session. Defaults mirror a classic pomodoro:
/// 25 focus minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionParams {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub break_duration_minutes: Option<u32>,
}

impl Default for StartSessionParams {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration(),
            session_type: SessionType::default(),
            break_duration_minutes: None,
        }
    }
}

impl StartSessionParams {
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes < MIN_DURATION_MINUTES
            || self.duration_minutes > MAX_DURATION_MINUTES
        {
            return Err(Error::Validation(format!(
                "duration_minutes must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES}, got {}",
                self.duration_minutes
            )));
        }
        if let Some(break_minutes) = self.break_duration_minutes {
            if break_minutes < 1 || break_minutes > MAX_BREAK_MINUTES {
                return Err(Error::Validation(format!(
                    "break_duration_minutes must be between 1 and {MAX_BREAK_MINUTES}, got {break_minutes}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteSessionParams {
    /// Minutes actually focused; when absent, elapsed time is used
    /// (truncated to whole minutes).
    #[serde(default)]
    pub actual_duration: Option<u32>,
}

impl CompleteSessionParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(actual) = self.actual_duration {
            if actual > MAX_ACTUAL_MINUTES {
                return Err(Error::Validation(format!(
                    "actual_duration must be at most {MAX_ACTUAL_MINUTES}, got {actual}"
                )));
            }
        }
        Ok(())
    }
}

/// A distraction to log. `session_id` is the primary addressing mode; when
/// omitted the record attaches to the caller's current active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractionInput {
    pub name: String,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

impl DistractionInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("distraction name must not be empty".into()));
        }
        if self.name.len() > MAX_DISTRACTION_NAME_LEN {
            return Err(Error::Validation(format!(
                "distraction name must be at most {MAX_DISTRACTION_NAME_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_completed_only() -> bool {
    true
}

/// Pagination over session history. Active sessions are excluded unless
/// `completed_only` is explicitly disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_completed_only")]
    pub completed_only: bool,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            skip: 0,
            completed_only: true,
        }
    }
}

impl HistoryQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_params_default_to_pomodoro() {
        let params = StartSessionParams::default();
        assert_eq!(params.duration_minutes, 25);
        assert_eq!(params.session_type, SessionType::Focus);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn start_params_reject_out_of_bounds_duration() {
        let mut params = StartSessionParams::default();
        params.duration_minutes = 0;
        assert!(matches!(params.validate(), Err(Error::Validation(_))));

        params.duration_minutes = MAX_DURATION_MINUTES + 1;
        assert!(matches!(params.validate(), Err(Error::Validation(_))));

        params.duration_minutes = MAX_DURATION_MINUTES;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn start_params_reject_bad_break() {
        let params = StartSessionParams {
            break_duration_minutes: Some(0),
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn distraction_input_rejects_blank_and_oversized_names() {
        let input = DistractionInput {
            name: "   ".into(),
            duration_seconds: None,
            session_id: None,
        };
        assert!(matches!(input.validate(), Err(Error::Validation(_))));

        let input = DistractionInput {
            name: "x".repeat(MAX_DISTRACTION_NAME_LEN + 1),
            duration_seconds: None,
            session_id: None,
        };
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn history_limit_is_clamped() {
        let query = HistoryQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), 1);

        let query = HistoryQuery {
            limit: 10_000,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_HISTORY_LIMIT);
    }

    #[test]
    fn history_defaults_exclude_active() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert!(query.completed_only);
        assert_eq!(query.limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(query.skip, 0);
    }
}
