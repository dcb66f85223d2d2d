use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Point;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl GeoLocation {
    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDetails {
    pub description: String,
    pub weight: Option<f64>,
    pub size: PackageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Bidding,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Bidding => "bidding",
            DeliveryStatus::Accepted => "accepted",
            DeliveryStatus::InProgress => "in_progress",
            DeliveryStatus::Completed => "completed",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    // The bidding window: new bids are only legal in these two states.
    pub fn is_open(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Bidding)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Cancelled)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub client_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub pickup_location: GeoLocation,
    pub dropoff_location: GeoLocation,
    pub package_details: PackageDetails,
    pub suggested_price: Option<f64>,
    pub status: DeliveryStatus,
    pub accepted_bid_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDelivery {
    pub pickup_location: GeoLocation,
    pub dropoff_location: GeoLocation,
    pub package_details: PackageDetails,
    pub suggested_price: Option<f64>,
}

// A requested transition. Accepted carries the assignment so the courier
// binding and the status flip land in the same mutation.
#[derive(Debug, Clone, Copy)]
pub enum StatusChange {
    Bidding,
    Accepted {
        courier_id: Uuid,
        accepted_bid_id: Uuid,
    },
    InProgress,
    Completed,
    Cancelled,
}

impl StatusChange {
    pub fn target(&self) -> DeliveryStatus {
        match self {
            StatusChange::Bidding => DeliveryStatus::Bidding,
            StatusChange::Accepted { .. } => DeliveryStatus::Accepted,
            StatusChange::InProgress => DeliveryStatus::InProgress,
            StatusChange::Completed => DeliveryStatus::Completed,
            StatusChange::Cancelled => DeliveryStatus::Cancelled,
        }
    }
}
