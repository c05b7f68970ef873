use serde::{Deserialize, Serialize};

/// Aggregated focus statistics over a trailing window.
///
/// A user with no sessions in the window gets the all-zero default rather
/// than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusStats {
    /// All sessions created in the window, active ones included.
    pub total_sessions: u32,
    pub completed_sessions: u32,
    /// Minutes from completed focus-type sessions only; breaks excluded.
    pub total_focus_minutes: u32,
    pub total_distractions: u32,
    /// `total_focus_minutes / completed_sessions`, 2 decimal places.
    pub average_session_duration: f64,
    /// `completed_sessions / total_sessions * 100`, 2 decimal places.
    pub completion_rate: f64,
    /// Consecutive calendar days ending today with at least one completed
    /// session.
    pub current_streak: u32,
}
