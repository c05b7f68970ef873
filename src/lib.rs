//! Focus-session tracking core: the session state machine, the distraction
//! log, and the statistics aggregator, backed by SQLite.
//!
//! The crate is transport-agnostic. A host wires it up by opening a
//! [`Database`] at startup and handing a [`SessionController`] the
//! authenticated user id for each call:
//!
//! ```no_run
//! use focusflow::{Database, SessionController, StartSessionParams};
//! use uuid::Uuid;
//!
//! # async fn demo() -> focusflow::Result<()> {
//! let db = Database::new("focusflow.sqlite3".into())?;
//! let controller = SessionController::new(db);
//!
//! let user_id = Uuid::new_v4();
//! let session = controller
//!     .start_session(user_id, StartSessionParams::default())
//!     .await?;
//! # let _ = session;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod sessions;
pub mod stats;

pub use db::{
    Database, Distraction, FocusSession, FocusStats, SessionType, SessionWithDistractions,
};
pub use error::{Error, Result};
pub use sessions::{
    CompleteSessionParams, DistractionInput, HistoryQuery, SessionController, StartSessionParams,
};
