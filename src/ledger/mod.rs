pub mod bids;
pub mod deliveries;
