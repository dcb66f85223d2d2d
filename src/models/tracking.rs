use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::delivery::DeliveryStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSample {
    pub delivery_id: Uuid,
    pub courier_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

/// Courier-submitted location update; `captured_at` defaults to the server
/// clock when the device omits it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: Option<DateTime<Utc>>,
}

// Wire payload for the tracking push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEvent {
    LocationUpdate {
        sample: LocationSample,
    },
    StatusChanged {
        delivery_id: Uuid,
        status: DeliveryStatus,
        changed_at: DateTime<Utc>,
    },
    Closed {
        delivery_id: Uuid,
        status: DeliveryStatus,
    },
}
