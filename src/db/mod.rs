mod connection;
pub(crate) mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{Distraction, FocusSession, FocusStats, SessionType, SessionWithDistractions};
