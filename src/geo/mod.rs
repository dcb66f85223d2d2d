use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EARTH_RADIUS_KM: f64 = 6_371.0;

// Average urban courier speed used for pickup-time estimates.
const CITY_SPEED_KMH: f64 = 30.0;

// Inclusive-radius slack for floating-point drift at the query boundary.
const RADIUS_TOLERANCE_KM: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lon = (delta_lon / 2.0).sin();

    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle
}

pub fn travel_minutes_estimate(distance_km: f64) -> u32 {
    (distance_km.max(0.0) / CITY_SPEED_KMH * 60.0).ceil() as u32
}

// Pickup coordinates of deliveries still inside the bidding window. Entries
// are immutable once inserted (pickup never moves), so concurrent readers
// can never see a half-updated point.
pub struct GeoIndex {
    entries: DashMap<Uuid, Point>,
}

impl GeoIndex {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn insert(&self, delivery_id: Uuid, pickup: Point) {
        self.entries.insert(delivery_id, pickup);
    }

    pub fn remove(&self, delivery_id: Uuid) {
        self.entries.remove(&delivery_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn within_radius(&self, center: Point, radius_km: f64) -> Vec<(Uuid, f64)> {
        let mut hits: Vec<(Uuid, f64)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let distance = haversine_km(center, *entry.value());
                (distance <= radius_km + RADIUS_TOLERANCE_KM).then_some((*entry.key(), distance))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self::new()
    }
}
