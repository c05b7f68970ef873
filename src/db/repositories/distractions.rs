use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_uuid, to_optional_u32},
    models::Distraction,
};
use crate::error::{Error, Result};

fn row_to_distraction(row: &Row) -> anyhow::Result<Distraction> {
    let id: String = row.get("id")?;
    let focus_session_id: String = row.get("focus_session_id")?;
    let duration_seconds: Option<i64> = row.get("duration_seconds")?;
    let occurred_at: String = row.get("occurred_at")?;

    Ok(Distraction {
        id: parse_uuid(&id, "id")?,
        focus_session_id: parse_uuid(&focus_session_id, "focus_session_id")?,
        name: row.get("name")?,
        duration_seconds: to_optional_u32(duration_seconds, "duration_seconds")?,
        occurred_at: parse_datetime(&occurred_at, "occurred_at")?,
    })
}

/// Distraction log for one session, oldest first.
pub(crate) fn distractions_for_session(
    conn: &Connection,
    session_id: Uuid,
) -> Result<Vec<Distraction>> {
    let mut stmt = conn.prepare(
        "SELECT id, focus_session_id, name, duration_seconds, occurred_at
         FROM distractions
         WHERE focus_session_id = ?1
         ORDER BY occurred_at ASC",
    )?;
    let mut rows = stmt.query(params![session_id.to_string()])?;

    let mut distractions = Vec::new();
    while let Some(row) = rows.next()? {
        distractions.push(row_to_distraction(row)?);
    }
    Ok(distractions)
}

/// Resolve the target session for a distraction write: an explicit id must
/// belong to the caller and still be active; no id means the caller's
/// current active session.
fn resolve_target_session(
    conn: &Connection,
    user_id: Uuid,
    session_id: Option<Uuid>,
) -> Result<Uuid> {
    match session_id {
        Some(id) => {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM focus_sessions
                     WHERE id = ?1 AND user_id = ?2 AND is_completed = 0",
                    params![id.to_string(), user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            match found {
                Some(_) => Ok(id),
                None => Err(Error::NotFound("session not found or not active")),
            }
        }
        None => {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM focus_sessions
                     WHERE user_id = ?1 AND is_completed = 0
                     LIMIT 1",
                    params![user_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            match found {
                Some(raw) => Ok(parse_uuid(&raw, "id")?),
                None => Err(Error::NotFound("no active session")),
            }
        }
    }
}

impl Database {
    /// Append a distraction. Target resolution and the insert share one
    /// transaction, so a session cancelled concurrently can never receive a
    /// late distraction row.
    pub async fn insert_distraction(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
        name: String,
        duration_seconds: Option<u32>,
        occurred_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Distraction> {
        self.execute(move |conn| {
            let tx = conn.transaction().map_err(Error::from)?;

            let target = resolve_target_session(&tx, user_id, session_id)?;
            let record = Distraction {
                id: Uuid::new_v4(),
                focus_session_id: target,
                name,
                duration_seconds,
                occurred_at,
            };

            tx.execute(
                "INSERT INTO distractions (id, focus_session_id, name, duration_seconds, occurred_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.to_string(),
                    record.focus_session_id.to_string(),
                    record.name,
                    record.duration_seconds.map(i64::from),
                    record.occurred_at.to_rfc3339(),
                ],
            )
            .map_err(Error::from)?;

            tx.commit().map_err(Error::from)?;
            Ok(record)
        })
        .await
    }

    /// Distractions for an explicit session (ownership checked; completed
    /// sessions keep their log) or, with no id, for the caller's active
    /// session.
    pub async fn list_distractions(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<Vec<Distraction>> {
        self.execute(move |conn| {
            let target = match session_id {
                Some(id) => {
                    let found: Option<String> = conn
                        .query_row(
                            "SELECT id FROM focus_sessions
                             WHERE id = ?1 AND user_id = ?2",
                            params![id.to_string(), user_id.to_string()],
                            |row| row.get(0),
                        )
                        .optional()?;
                    if found.is_none() {
                        return Err(Error::NotFound("session not found"));
                    }
                    id
                }
                None => {
                    let found: Option<String> = conn
                        .query_row(
                            "SELECT id FROM focus_sessions
                             WHERE user_id = ?1 AND is_completed = 0
                             LIMIT 1",
                            params![user_id.to_string()],
                            |row| row.get(0),
                        )
                        .optional()?;
                    match found {
                        Some(raw) => parse_uuid(&raw, "id")?,
                        None => return Err(Error::NotFound("no active session")),
                    }
                }
            };

            distractions_for_session(conn, target)
        })
        .await
    }
}
