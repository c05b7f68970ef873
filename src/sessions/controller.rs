use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::db::{
    helpers::{local_day_bounds, local_today},
    models::{Distraction, FocusSession, FocusStats, SessionWithDistractions},
    Database,
};
use crate::error::{Error, Result};
use crate::stats;

use super::params::{
    CompleteSessionParams, DistractionInput, HistoryQuery, StartSessionParams,
};

/// The focus-session state machine. Every operation takes the caller's
/// already-authenticated user id; identity verification belongs to the
/// transport layer.
///
/// States per user: no session -> one active session -> completed (kept) or
/// cancelled (deleted, back to none).
#[derive(Clone)]
pub struct SessionController {
    db: Database,
}

impl SessionController {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Start a new session. Fails with [`Error::SessionConflict`] when the
    /// user already has an active one; the error carries the existing
    /// session's id and start time so a client can resume it instead.
    pub async fn start_session(
        &self,
        user_id: Uuid,
        params: StartSessionParams,
    ) -> Result<FocusSession> {
        params.validate()?;

        let now = Utc::now();
        let session = FocusSession {
            id: Uuid::new_v4(),
            user_id,
            duration_minutes: params.duration_minutes,
            session_type: params.session_type,
            break_duration_minutes: params.break_duration_minutes,
            started_at: now,
            ended_at: None,
            is_completed: false,
            actual_duration: None,
            created_at: now,
            updated_at: now,
        };

        let session = self.db.create_session_if_idle(session).await?;
        info!(
            "Started {} session {} ({} min) for user {}",
            session.session_type.as_str(),
            session.id,
            session.duration_minutes,
            user_id
        );
        Ok(session)
    }

    /// Complete the active session. The second of two back-to-back calls
    /// fails with `NotFound`: completion leaves no active session behind.
    pub async fn complete_session(
        &self,
        user_id: Uuid,
        params: CompleteSessionParams,
    ) -> Result<FocusSession> {
        params.validate()?;

        let session = self
            .db
            .complete_active_session(user_id, params.actual_duration, Utc::now())
            .await?
            .ok_or(Error::NotFound("no active session"))?;

        info!(
            "Completed session {} for user {} (actual {} min)",
            session.id,
            user_id,
            session.actual_duration.unwrap_or(0)
        );
        Ok(session)
    }

    /// Cancel the active session. Destructive: the session and its
    /// distraction log are deleted and never show up in history or stats.
    pub async fn cancel_session(&self, user_id: Uuid) -> Result<()> {
        let session_id = self
            .db
            .delete_active_session(user_id)
            .await?
            .ok_or(Error::NotFound("no active session"))?;

        info!("Cancelled session {session_id} for user {user_id}");
        Ok(())
    }

    /// The active session with its distractions, for clients resuming after
    /// a reload.
    pub async fn get_active_session(&self, user_id: Uuid) -> Result<SessionWithDistractions> {
        self.db
            .active_session_with_distractions(user_id)
            .await?
            .ok_or(Error::NotFound("no active session"))
    }

    /// Paginated history, newest first. Excludes active sessions unless the
    /// query opts out of `completed_only`.
    pub async fn get_history(
        &self,
        user_id: Uuid,
        query: HistoryQuery,
    ) -> Result<Vec<SessionWithDistractions>> {
        self.db
            .list_sessions_with_distractions(
                user_id,
                query.effective_limit(),
                query.skip,
                query.completed_only,
            )
            .await
    }

    /// All sessions started during the current local calendar day, oldest
    /// first.
    pub async fn get_today(&self, user_id: Uuid) -> Result<Vec<SessionWithDistractions>> {
        let (start, end) = local_day_bounds(local_today());
        self.db.sessions_started_between(user_id, start, end).await
    }

    /// Log a distraction against an explicit session (which must be the
    /// caller's and active) or, with no id, against the current active
    /// session.
    pub async fn log_distraction(
        &self,
        user_id: Uuid,
        input: DistractionInput,
    ) -> Result<Distraction> {
        input.validate()?;

        let distraction = self
            .db
            .insert_distraction(
                user_id,
                input.session_id,
                input.name,
                input.duration_seconds,
                Utc::now(),
            )
            .await?;

        info!(
            "Logged distraction {} on session {} for user {}",
            distraction.id, distraction.focus_session_id, user_id
        );
        Ok(distraction)
    }

    /// Distractions for an explicit session (any state, ownership checked)
    /// or for the active session when no id is given, oldest first.
    pub async fn list_distractions(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<Vec<Distraction>> {
        self.db.list_distractions(user_id, session_id).await
    }

    /// Windowed statistics; `window_days` defaults to 7.
    pub async fn compute_stats(
        &self,
        user_id: Uuid,
        window_days: Option<u32>,
    ) -> Result<FocusStats> {
        stats::compute(&self.db, user_id, window_days).await
    }
}
