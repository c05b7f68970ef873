pub mod distractions;
pub mod sessions;
