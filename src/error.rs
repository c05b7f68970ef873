use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a session operation can fail with. `SessionConflict` carries
/// the blocking session's identity so a client can offer to resume it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("an active session already exists (id {session_id}, started {started_at})")]
    SessionConflict {
        session_id: Uuid,
        started_at: DateTime<Utc>,
    },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(anyhow::Error::new(err))
    }
}
