pub mod actor;
pub mod bid;
pub mod delivery;
pub mod tracking;
