use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub model: String,
    pub plate_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub courier_id: Uuid,
    pub amount: f64,
    pub estimated_time_minutes: u32,
    pub message: Option<String>,
    pub vehicle_info: Option<VehicleInfo>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    pub delivery_id: Uuid,
    pub amount: f64,
    pub estimated_time_minutes: u32,
    pub message: Option<String>,
    pub vehicle_info: Option<VehicleInfo>,
}
