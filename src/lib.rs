pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod identity;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod observability;
pub mod state;
pub mod tracking;
