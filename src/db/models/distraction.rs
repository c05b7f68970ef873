use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An interruption logged against a focus session. Append-only: distractions
/// are never mutated and disappear only when their session is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distraction {
    pub id: Uuid,
    pub focus_session_id: Uuid,
    pub name: String,
    pub duration_seconds: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}
