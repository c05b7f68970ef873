pub mod controller;
pub mod params;

pub use controller::SessionController;
pub use params::{
    CompleteSessionParams, DistractionInput, HistoryQuery, StartSessionParams,
};
