//! Per-delivery live-tracking channels: a broadcast fanout plus a cache of
//! the latest location sample so late subscribers start from a known point.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::DeliveryStatus;
use crate::models::tracking::{LocationSample, TrackingEvent};

struct TrackingChannel {
    tx: broadcast::Sender<TrackingEvent>,
    latest: Option<LocationSample>,
    closed: bool,
}

impl TrackingChannel {
    fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self {
            tx,
            latest: None,
            closed: false,
        }
    }
}

/// What a new subscriber starts from: the delivery's status at join time,
/// the retained sample if any, and a live receiver for everything after.
pub struct TrackingSubscription {
    pub status: DeliveryStatus,
    pub status_changed_at: DateTime<Utc>,
    pub latest: Option<LocationSample>,
    pub closed: bool,
    pub events: broadcast::Receiver<TrackingEvent>,
}

pub struct TrackingStream {
    channels: DashMap<Uuid, TrackingChannel>,
    buffer: usize,
}

impl TrackingStream {
    pub fn new(buffer: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer,
        }
    }

    /// Accepts a sample if it is strictly newer than the retained one,
    /// broadcasting it to subscribers. Stale or equal-timestamp replays have
    /// no observable effect and hand back the retained sample unchanged.
    /// Send failures mean nobody is listening right now; the cache still
    /// advances so the next subscriber sees the freshest point.
    pub fn publish(&self, sample: LocationSample) -> Result<LocationSample, AppError> {
        let mut entry = self
            .channels
            .entry(sample.delivery_id)
            .or_insert_with(|| TrackingChannel::new(self.buffer));
        let channel = entry.value_mut();

        if channel.closed {
            return Err(AppError::StreamClosed);
        }
        if let Some(latest) = &channel.latest {
            if sample.captured_at <= latest.captured_at {
                debug!(
                    delivery_id = %sample.delivery_id,
                    captured_at = %sample.captured_at,
                    "stale location sample dropped"
                );
                return Ok(latest.clone());
            }
        }

        channel.latest = Some(sample.clone());
        let _ = channel.tx.send(TrackingEvent::LocationUpdate {
            sample: sample.clone(),
        });
        Ok(sample)
    }

    /// Subscribes under the channel's entry guard, so the snapshot and the
    /// receiver cut the event sequence at the same instant: nothing published
    /// after the snapshot can be missed, nothing before it is replayed.
    pub fn subscribe(
        &self,
        delivery_id: Uuid,
        status: DeliveryStatus,
        status_changed_at: DateTime<Utc>,
    ) -> TrackingSubscription {
        let mut entry = self
            .channels
            .entry(delivery_id)
            .or_insert_with(|| TrackingChannel::new(self.buffer));
        let channel = entry.value_mut();

        if status.is_terminal() {
            channel.closed = true;
        }
        TrackingSubscription {
            status,
            status_changed_at,
            latest: channel.latest.clone(),
            closed: channel.closed,
            events: channel.tx.subscribe(),
        }
    }

    /// Fans out a status change. Terminal statuses additionally emit the
    /// closing event and tombstone the channel; the entry stays in the map so
    /// a racing publish observes `closed` instead of resurrecting it.
    pub fn status_changed(
        &self,
        delivery_id: Uuid,
        status: DeliveryStatus,
        changed_at: DateTime<Utc>,
    ) {
        let mut entry = self
            .channels
            .entry(delivery_id)
            .or_insert_with(|| TrackingChannel::new(self.buffer));
        let channel = entry.value_mut();

        let _ = channel.tx.send(TrackingEvent::StatusChanged {
            delivery_id,
            status,
            changed_at,
        });
        if status.is_terminal() {
            channel.closed = true;
            let _ = channel.tx.send(TrackingEvent::Closed {
                delivery_id,
                status,
            });
        }
    }
}
