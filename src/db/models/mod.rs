pub mod distraction;
pub mod session;
pub mod stats;

pub use distraction::Distraction;
pub use session::{FocusSession, SessionType, SessionWithDistractions};
pub use stats::FocusStats;
