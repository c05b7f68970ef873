use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{
        parse_datetime, parse_optional_datetime, parse_session_type, parse_uuid, to_optional_u32,
        to_u32,
    },
    models::{FocusSession, SessionWithDistractions},
    repositories::distractions::distractions_for_session,
};
use crate::error::{Error, Result};

const SESSION_COLUMNS: &str = "id, user_id, duration_minutes, session_type, \
     break_duration_minutes, started_at, ended_at, is_completed, actual_duration, \
     created_at, updated_at";

fn row_to_session(row: &Row) -> anyhow::Result<FocusSession> {
    let id: String = row.get("id")?;
    let user_id: String = row.get("user_id")?;
    let duration_minutes: i64 = row.get("duration_minutes")?;
    let session_type: String = row.get("session_type")?;
    let break_duration_minutes: Option<i64> = row.get("break_duration_minutes")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let actual_duration: Option<i64> = row.get("actual_duration")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(FocusSession {
        id: parse_uuid(&id, "id")?,
        user_id: parse_uuid(&user_id, "user_id")?,
        duration_minutes: to_u32(duration_minutes, "duration_minutes")?,
        session_type: parse_session_type(&session_type)?,
        break_duration_minutes: to_optional_u32(break_duration_minutes, "break_duration_minutes")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        is_completed: row.get("is_completed")?,
        actual_duration: to_optional_u32(actual_duration, "actual_duration")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

/// Look up the caller's active session inside the current task. Works on a
/// transaction as well through deref.
fn find_active(conn: &Connection, user_id: Uuid) -> Result<Option<FocusSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS}
         FROM focus_sessions
         WHERE user_id = ?1 AND is_completed = 0
         LIMIT 1",
    ))?;

    let session = stmt
        .query_row(params![user_id.to_string()], |row| {
            Ok(row_to_session(row))
        })
        .optional()?
        .transpose()?;

    Ok(session)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    /// Insert a new session, but only if the user has no active one. The
    /// check and the insert run in one transaction on the serialized worker,
    /// so concurrent starts cannot both pass the check; the partial unique
    /// index on `(user_id) WHERE is_completed = 0` backs the same invariant
    /// at the schema level.
    pub async fn create_session_if_idle(&self, session: FocusSession) -> Result<FocusSession> {
        self.execute(move |conn| {
            let tx = conn.transaction().map_err(Error::from)?;

            if let Some(existing) = find_active(&tx, session.user_id)? {
                return Err(Error::SessionConflict {
                    session_id: existing.id,
                    started_at: existing.started_at,
                });
            }

            let inserted = tx.execute(
                "INSERT INTO focus_sessions (id, user_id, duration_minutes, session_type,
                     break_duration_minutes, started_at, ended_at, is_completed,
                     actual_duration, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    session.id.to_string(),
                    session.user_id.to_string(),
                    i64::from(session.duration_minutes),
                    session.session_type.as_str(),
                    session.break_duration_minutes.map(i64::from),
                    session.started_at.to_rfc3339(),
                    session.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
                    session.is_completed,
                    session.actual_duration.map(i64::from),
                    session.created_at.to_rfc3339(),
                    session.updated_at.to_rfc3339(),
                ],
            );

            match inserted {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    // The unique index caught a racing active session.
                    let existing = find_active(&tx, session.user_id)?;
                    return match existing {
                        Some(active) => Err(Error::SessionConflict {
                            session_id: active.id,
                            started_at: active.started_at,
                        }),
                        None => Err(err.into()),
                    };
                }
                Err(err) => return Err(err.into()),
            }

            tx.commit().map_err(Error::from)?;
            Ok(session)
        })
        .await
    }

    pub async fn active_session_with_distractions(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SessionWithDistractions>> {
        self.execute(move |conn| {
            let session = match find_active(conn, user_id)? {
                Some(session) => session,
                None => return Ok(None),
            };
            let distractions = distractions_for_session(conn, session.id)?;
            Ok(Some(SessionWithDistractions {
                session,
                distractions,
            }))
        })
        .await
    }

    /// Transition the user's active session to completed. Returns the updated
    /// record, or `None` when no session is active (the caller decides how to
    /// surface that). `actual_override` wins over the elapsed-time fallback,
    /// which truncates to whole minutes.
    pub async fn complete_active_session(
        &self,
        user_id: Uuid,
        actual_override: Option<u32>,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<FocusSession>> {
        self.execute(move |conn| {
            let tx = conn.transaction().map_err(Error::from)?;

            let mut session = match find_active(&tx, user_id)? {
                Some(session) => session,
                None => return Ok(None),
            };

            let elapsed_secs = (completed_at - session.started_at).num_seconds().max(0);
            let actual = actual_override.unwrap_or((elapsed_secs / 60) as u32);

            tx.execute(
                "UPDATE focus_sessions
                 SET is_completed = 1,
                     ended_at = ?1,
                     actual_duration = ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                params![
                    completed_at.to_rfc3339(),
                    i64::from(actual),
                    completed_at.to_rfc3339(),
                    session.id.to_string(),
                ],
            )
            .map_err(Error::from)?;

            tx.commit().map_err(Error::from)?;

            session.is_completed = true;
            session.ended_at = Some(completed_at);
            session.actual_duration = Some(actual);
            session.updated_at = completed_at;
            Ok(Some(session))
        })
        .await
    }

    /// Hard-delete the user's active session together with its distraction
    /// log. Returns the deleted session's id, or `None` if nothing was
    /// active. Cancellation leaves no history.
    pub async fn delete_active_session(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        self.execute(move |conn| {
            let tx = conn.transaction().map_err(Error::from)?;

            let session = match find_active(&tx, user_id)? {
                Some(session) => session,
                None => return Ok(None),
            };

            // The FK is ON DELETE CASCADE; the explicit delete keeps the
            // cascade visible in the transaction.
            tx.execute(
                "DELETE FROM distractions WHERE focus_session_id = ?1",
                params![session.id.to_string()],
            )
            .map_err(Error::from)?;
            tx.execute(
                "DELETE FROM focus_sessions WHERE id = ?1",
                params![session.id.to_string()],
            )
            .map_err(Error::from)?;

            tx.commit().map_err(Error::from)?;
            Ok(Some(session.id))
        })
        .await
    }

    /// Session history, newest first, each with its distraction list. When
    /// `completed_only` is set (the default view) active sessions never
    /// appear.
    pub async fn list_sessions_with_distractions(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
        completed_only: bool,
    ) -> Result<Vec<SessionWithDistractions>> {
        let limit = limit as i64;
        let offset = offset as i64;
        self.execute(move |conn| {
            let sql = if completed_only {
                format!(
                    "SELECT {SESSION_COLUMNS}
                     FROM focus_sessions
                     WHERE user_id = ?1 AND is_completed = 1
                     ORDER BY created_at DESC
                     LIMIT ?2 OFFSET ?3"
                )
            } else {
                format!(
                    "SELECT {SESSION_COLUMNS}
                     FROM focus_sessions
                     WHERE user_id = ?1
                     ORDER BY created_at DESC
                     LIMIT ?2 OFFSET ?3"
                )
            };

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![user_id.to_string(), limit, offset])?;

            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            drop(rows);
            drop(stmt);

            let mut detailed = Vec::with_capacity(sessions.len());
            for session in sessions {
                let distractions = distractions_for_session(conn, session.id)?;
                detailed.push(SessionWithDistractions {
                    session,
                    distractions,
                });
            }
            Ok(detailed)
        })
        .await
    }

    /// Sessions whose `started_at` falls within `[start, end)`, ascending by
    /// start time, each with its distraction list. Used for the today view.
    pub async fn sessions_started_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionWithDistractions>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM focus_sessions
                 WHERE user_id = ?1 AND started_at >= ?2 AND started_at < ?3
                 ORDER BY started_at ASC"
            ))?;
            let mut rows = stmt.query(params![
                user_id.to_string(),
                start.to_rfc3339(),
                end.to_rfc3339()
            ])?;

            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            drop(rows);
            drop(stmt);

            let mut detailed = Vec::with_capacity(sessions.len());
            for session in sessions {
                let distractions = distractions_for_session(conn, session.id)?;
                detailed.push(SessionWithDistractions {
                    session,
                    distractions,
                });
            }
            Ok(detailed)
        })
        .await
    }

    /// All of a user's sessions created at or after `cutoff`. Feeds the
    /// statistics window.
    pub async fn sessions_created_since(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM focus_sessions
                 WHERE user_id = ?1 AND created_at >= ?2"
            ))?;
            let mut rows = stmt.query(params![user_id.to_string(), cutoff.to_rfc3339()])?;

            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Start times of completed sessions at or after `cutoff`. One range
    /// query; the streak walk groups these into calendar days in memory.
    pub async fn completed_session_starts_since(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT started_at
                 FROM focus_sessions
                 WHERE user_id = ?1 AND is_completed = 1 AND started_at >= ?2",
            )?;
            let mut rows = stmt.query(params![user_id.to_string(), cutoff.to_rfc3339()])?;

            let mut starts = Vec::new();
            while let Some(row) = rows.next()? {
                let raw: String = row.get(0)?;
                starts.push(parse_datetime(&raw, "started_at")?);
            }
            Ok(starts)
        })
        .await
    }

    /// Distraction rows belonging to sessions created at or after `cutoff`.
    pub async fn count_distractions_since(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<u32> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*)
                 FROM distractions d
                 JOIN focus_sessions s ON s.id = d.focus_session_id
                 WHERE s.user_id = ?1 AND s.created_at >= ?2",
                params![user_id.to_string(), cutoff.to_rfc3339()],
                |row| row.get(0),
            )?;
            Ok(to_u32(count, "distraction count")?)
        })
        .await
    }
}
