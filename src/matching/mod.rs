//! The single mutation entry point of the marketplace. Every operation that
//! touches one delivery's state funnels through here so the per-delivery
//! gate can serialize writers, let composite readers overlap, and leave
//! unrelated deliveries uncontended.

pub mod gates;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::geo::{self, GeoIndex, Point};
use crate::ledger::bids::BidLedger;
use crate::ledger::deliveries::DeliveryLedger;
use crate::matching::gates::DeliveryGates;
use crate::models::actor::{Actor, Role};
use crate::models::bid::{Bid, NewBid};
use crate::models::delivery::{Delivery, DeliveryStatus, NewDelivery, StatusChange};
use crate::models::tracking::{LocationSample, NewLocationSample};
use crate::observability::metrics::Metrics;
use crate::tracking::{TrackingStream, TrackingSubscription};

/// A nearby open delivery as a courier sees it during discovery.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredJob {
    pub delivery: Delivery,
    pub distance_km: f64,
    pub estimated_pickup_minutes: u32,
}

pub struct MatchingCoordinator {
    deliveries: Arc<DeliveryLedger>,
    bids: Arc<BidLedger>,
    geo: Arc<GeoIndex>,
    tracking: Arc<TrackingStream>,
    gates: DeliveryGates,
    metrics: Arc<Metrics>,
    default_radius_km: f64,
    max_radius_km: f64,
}

impl MatchingCoordinator {
    pub fn new(config: &Config, metrics: Arc<Metrics>) -> Self {
        let geo = Arc::new(GeoIndex::new());
        let deliveries = Arc::new(DeliveryLedger::new(geo.clone(), config.max_price));
        let bids = Arc::new(BidLedger::new(deliveries.clone()));
        let tracking = Arc::new(TrackingStream::new(config.event_buffer_size));

        Self {
            deliveries,
            bids,
            geo,
            tracking,
            gates: DeliveryGates::new(),
            metrics,
            default_radius_km: config.default_search_radius_km,
            max_radius_km: config.max_search_radius_km,
        }
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.len()
    }

    pub fn open_job_count(&self) -> usize {
        self.geo.len()
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn create_delivery(&self, actor: &Actor, new: NewDelivery) -> Result<Delivery, AppError> {
        require_role(actor, Role::Client)?;
        let delivery = self.deliveries.create(actor.user_id, new)?;
        self.metrics.deliveries_created_total.inc();
        self.metrics.open_deliveries.set(self.geo.len() as i64);
        Ok(delivery)
    }

    pub fn list_my_deliveries(&self, actor: &Actor) -> Result<Vec<Delivery>, AppError> {
        require_role(actor, Role::Client)?;
        Ok(self.deliveries.list_for_client(actor.user_id))
    }

    pub fn get_delivery(&self, delivery_id: Uuid) -> Result<Delivery, AppError> {
        self.deliveries.get(delivery_id)
    }

    pub fn active_delivery(&self, actor: &Actor) -> Result<Delivery, AppError> {
        require_role(actor, Role::Courier)?;
        self.deliveries
            .active_for_courier(actor.user_id)
            .ok_or_else(|| AppError::NotFound("no active delivery".to_string()))
    }

    /// Radius search over open pickups. Gateless: results are advisory, and
    /// a delivery that closes between discovery and the bid attempt simply
    /// fails that bid with a conflict.
    pub fn discover_jobs(
        &self,
        actor: &Actor,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<DiscoveredJob>, AppError> {
        require_role(actor, Role::Courier)?;
        if !geo::valid_coordinates(latitude, longitude) {
            return Err(AppError::Validation(
                "search center coordinates out of range".to_string(),
            ));
        }
        let radius = radius_km.unwrap_or(self.default_radius_km);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AppError::Validation(
                "search radius must be positive".to_string(),
            ));
        }
        let radius = radius.min(self.max_radius_km);
        let center = Point {
            latitude,
            longitude,
        };

        let jobs = self
            .geo
            .within_radius(center, radius)
            .into_iter()
            .filter_map(|(delivery_id, distance_km)| {
                // The index can momentarily hold an id whose delivery just
                // closed; re-check the record before offering it.
                let delivery = self.deliveries.get(delivery_id).ok()?;
                delivery.status.is_open().then(|| DiscoveredJob {
                    estimated_pickup_minutes: geo::travel_minutes_estimate(distance_km),
                    distance_km,
                    delivery,
                })
            })
            .collect();
        Ok(jobs)
    }

    pub async fn place_bid(&self, actor: &Actor, new: NewBid) -> Result<Bid, AppError> {
        require_role(actor, Role::Courier)?;
        let delivery_id = new.delivery_id;
        let _gate = self.gates.exclusive(delivery_id).await;

        let was_pending = matches!(
            self.deliveries.status_of(delivery_id),
            Ok(DeliveryStatus::Pending)
        );
        let bid = self.bids.submit(actor, new)?;

        if was_pending {
            let delivery = self.deliveries.get(delivery_id)?;
            self.tracking
                .status_changed(delivery.id, delivery.status, delivery.status_updated_at);
            self.metrics
                .status_transitions_total
                .with_label_values(&[delivery.status.as_str()])
                .inc();
        }
        self.metrics.bids_placed_total.inc();
        Ok(bid)
    }

    pub async fn list_bids(&self, actor: &Actor, delivery_id: Uuid) -> Result<Vec<Bid>, AppError> {
        let _gate = self.gates.shared(delivery_id).await;
        let delivery = self.deliveries.get(delivery_id)?;
        if actor.user_id != delivery.client_id {
            return Err(AppError::Unauthorized(
                "only the delivery's client may view its bids".to_string(),
            ));
        }
        Ok(self.bids.list_for_delivery(delivery_id))
    }

    pub fn list_my_bids(&self, actor: &Actor) -> Result<Vec<Bid>, AppError> {
        require_role(actor, Role::Courier)?;
        Ok(self.bids.list_for_courier(actor.user_id))
    }

    pub async fn accept_bid(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
        bid_id: Uuid,
    ) -> Result<(Bid, Delivery), AppError> {
        require_role(actor, Role::Client)?;
        let _gate = self.gates.exclusive(delivery_id).await;

        let started = Instant::now();
        let result = self.bids.accept(actor, delivery_id, bid_id);
        let outcome = if result.is_ok() { "accepted" } else { "rejected" };
        self.metrics
            .accepts_total
            .with_label_values(&[outcome])
            .inc();
        self.metrics
            .accept_latency_seconds
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        let (bid, delivery) = result?;
        self.tracking
            .status_changed(delivery.id, delivery.status, delivery.status_updated_at);
        self.metrics
            .status_transitions_total
            .with_label_values(&[delivery.status.as_str()])
            .inc();
        self.metrics.open_deliveries.set(self.geo.len() as i64);
        Ok((bid, delivery))
    }

    /// Courier- and client-driven progress updates. Only the statuses an
    /// actor can reach directly are accepted here; `bidding` and `accepted`
    /// happen as side effects of bidding and acceptance.
    pub async fn update_status(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
        target: DeliveryStatus,
    ) -> Result<Delivery, AppError> {
        let change = match target {
            DeliveryStatus::InProgress => StatusChange::InProgress,
            DeliveryStatus::Completed => StatusChange::Completed,
            DeliveryStatus::Cancelled => StatusChange::Cancelled,
            other => {
                return Err(AppError::Validation(format!(
                    "status {other} cannot be set directly"
                )));
            }
        };

        let _gate = self.gates.exclusive(delivery_id).await;
        let delivery = self.deliveries.transition(delivery_id, change, actor)?;

        self.tracking
            .status_changed(delivery.id, delivery.status, delivery.status_updated_at);
        self.metrics
            .status_transitions_total
            .with_label_values(&[delivery.status.as_str()])
            .inc();
        self.metrics.open_deliveries.set(self.geo.len() as i64);
        Ok(delivery)
    }

    pub async fn cancel_delivery(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
    ) -> Result<Delivery, AppError> {
        self.update_status(actor, delivery_id, DeliveryStatus::Cancelled)
            .await
    }

    /// Publishes a courier location. Holds the shared gate across the
    /// check-and-publish so a concurrent cancellation (exclusive) can never
    /// land between the status check and the broadcast.
    pub async fn publish_location(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
        new: NewLocationSample,
    ) -> Result<LocationSample, AppError> {
        require_role(actor, Role::Courier)?;
        if !geo::valid_coordinates(new.latitude, new.longitude) {
            return Err(AppError::Validation(
                "location coordinates out of range".to_string(),
            ));
        }

        let _gate = self.gates.shared(delivery_id).await;
        let delivery = self.deliveries.get(delivery_id)?;
        if !matches!(
            delivery.status,
            DeliveryStatus::Accepted | DeliveryStatus::InProgress
        ) {
            return Err(AppError::StreamClosed);
        }
        if delivery.courier_id != Some(actor.user_id) {
            return Err(AppError::Unauthorized(
                "only the assigned courier may publish locations".to_string(),
            ));
        }

        let sample = LocationSample {
            delivery_id,
            courier_id: actor.user_id,
            latitude: new.latitude,
            longitude: new.longitude,
            captured_at: new.captured_at.unwrap_or_else(Utc::now),
        };
        let retained = self.tracking.publish(sample)?;
        self.metrics.location_samples_total.inc();
        Ok(retained)
    }

    pub async fn subscribe_tracking(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
    ) -> Result<TrackingSubscription, AppError> {
        let _gate = self.gates.shared(delivery_id).await;
        let delivery = self.deliveries.get(delivery_id)?;
        let allowed = actor.user_id == delivery.client_id
            || delivery.courier_id == Some(actor.user_id);
        if !allowed {
            return Err(AppError::Unauthorized(
                "tracking is limited to the delivery's client and courier".to_string(),
            ));
        }
        Ok(self
            .tracking
            .subscribe(delivery_id, delivery.status, delivery.status_updated_at))
    }
}

fn require_role(actor: &Actor, role: Role) -> Result<(), AppError> {
    if actor.role != role {
        return Err(AppError::Unauthorized(format!(
            "this operation requires the {role} role"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use uuid::Uuid;

    use super::MatchingCoordinator;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::models::actor::Actor;
    use crate::models::bid::NewBid;
    use crate::models::delivery::{
        DeliveryStatus, GeoLocation, NewDelivery, PackageDetails, PackageSize,
    };
    use crate::models::tracking::{NewLocationSample, TrackingEvent};
    use crate::observability::metrics::Metrics;

    fn coordinator() -> Arc<MatchingCoordinator> {
        let config = Config {
            http_port: 0,
            log_level: "info".to_string(),
            event_buffer_size: 64,
            default_search_radius_km: 10.0,
            max_search_radius_km: 50.0,
            max_price: 10_000.0,
        };
        Arc::new(MatchingCoordinator::new(&config, Arc::new(Metrics::new())))
    }

    fn harare_delivery() -> NewDelivery {
        NewDelivery {
            pickup_location: GeoLocation {
                latitude: -17.8252,
                longitude: 31.0335,
                address: "23 Samora Machel Ave".to_string(),
            },
            dropoff_location: GeoLocation {
                latitude: -17.7833,
                longitude: 31.05,
                address: "12 Borrowdale Rd".to_string(),
            },
            package_details: PackageDetails {
                description: "documents".to_string(),
                weight: None,
                size: PackageSize::Small,
            },
            suggested_price: Some(15.0),
        }
    }

    fn bulawayo_delivery() -> NewDelivery {
        let mut new = harare_delivery();
        new.pickup_location = GeoLocation {
            latitude: -20.1325,
            longitude: 28.6265,
            address: "9 Fife St".to_string(),
        };
        new
    }

    fn bid(delivery_id: Uuid, amount: f64, minutes: u32) -> NewBid {
        NewBid {
            delivery_id,
            amount,
            estimated_time_minutes: minutes,
            message: None,
            vehicle_info: None,
        }
    }

    #[tokio::test]
    async fn role_checks_guard_each_side_of_the_market() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let courier = Actor::courier(Uuid::new_v4());

        assert!(matches!(
            coordinator.create_delivery(&courier, harare_delivery()),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator.discover_jobs(&client, -17.83, 31.05, None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator.place_bid(&client, bid(Uuid::new_v4(), 10.0, 10)).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator.list_my_deliveries(&courier),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator.active_delivery(&client),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn nearby_open_jobs_are_discovered_in_distance_order() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let near = coordinator.create_delivery(&client, harare_delivery()).unwrap();
        coordinator.create_delivery(&client, bulawayo_delivery()).unwrap();

        let courier = Actor::courier(Uuid::new_v4());
        let jobs = coordinator
            .discover_jobs(&courier, -17.83, 31.05, None)
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].delivery.id, near.id);
        assert!(jobs[0].distance_km < 3.0);
        assert!(jobs[0].estimated_pickup_minutes >= 1);

        // An oversized radius clamps to the configured maximum, which still
        // leaves Bulawayo out of range.
        let clamped = coordinator
            .discover_jobs(&courier, -17.83, 31.05, Some(100_000.0))
            .unwrap();
        assert_eq!(clamped.len(), 1);

        assert!(matches!(
            coordinator.discover_jobs(&courier, -91.0, 31.05, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            coordinator.discover_jobs(&courier, -17.83, 31.05, Some(-2.0)),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn discovery_is_advisory_until_the_bid_lands() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let courier = Actor::courier(Uuid::new_v4());
        let jobs = coordinator
            .discover_jobs(&courier, -17.83, 31.05, None)
            .unwrap();
        assert_eq!(jobs.len(), 1);

        coordinator.cancel_delivery(&client, delivery.id).await.unwrap();

        let err = coordinator
            .place_bid(&courier, bid(delivery.id, 12.0, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeliveryNotOpen(_)));
        assert!(coordinator
            .discover_jobs(&courier, -17.83, 31.05, None)
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_first_bids_open_bidding_exactly_once() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let mut watcher = coordinator
            .subscribe_tracking(&client, delivery.id)
            .await
            .unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let coordinator = coordinator.clone();
                let delivery_id = delivery.id;
                tokio::spawn(async move {
                    let courier = Actor::courier(Uuid::new_v4());
                    coordinator
                        .place_bid(&courier, bid(delivery_id, 10.0 + i as f64, 20))
                        .await
                })
            })
            .collect();

        for joined in join_all(tasks).await {
            joined.unwrap().unwrap();
        }

        let delivery = coordinator.get_delivery(delivery.id).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Bidding);
        assert_eq!(
            coordinator.list_bids(&client, delivery.id).await.unwrap().len(),
            8
        );

        let mut bidding_events = 0;
        while let Ok(event) = watcher.events.try_recv() {
            if matches!(
                event,
                TrackingEvent::StatusChanged {
                    status: DeliveryStatus::Bidding,
                    ..
                }
            ) {
                bidding_events += 1;
            }
        }
        assert_eq!(bidding_events, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simultaneous_accepts_pick_exactly_one_winner() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let bid_a = coordinator
            .place_bid(&Actor::courier(Uuid::new_v4()), bid(delivery.id, 14.5, 25))
            .await
            .unwrap();
        let bid_b = coordinator
            .place_bid(&Actor::courier(Uuid::new_v4()), bid(delivery.id, 16.0, 15))
            .await
            .unwrap();

        let tasks: Vec<_> = [bid_a.id, bid_b.id]
            .into_iter()
            .map(|bid_id| {
                let coordinator = coordinator.clone();
                let delivery_id = delivery.id;
                tokio::spawn(async move {
                    coordinator.accept_bid(&client, delivery_id, bid_id).await
                })
            })
            .collect();

        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let winners: Vec<_> = outcomes.iter().filter(|r| r.is_ok()).collect();
        assert_eq!(winners.len(), 1);
        for outcome in &outcomes {
            if let Err(err) = outcome {
                assert!(matches!(
                    err,
                    AppError::DeliveryNotBidding(DeliveryStatus::Accepted)
                ));
            }
        }

        let settled = coordinator.get_delivery(delivery.id).unwrap();
        assert_eq!(settled.status, DeliveryStatus::Accepted);
        let (winning_bid, _) = winners[0].as_ref().unwrap();
        assert_eq!(settled.accepted_bid_id, Some(winning_bid.id));
        assert_eq!(settled.courier_id, Some(winning_bid.courier_id));
    }

    #[tokio::test]
    async fn bid_listing_is_visible_to_the_client_alone() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let courier = Actor::courier(Uuid::new_v4());
        coordinator
            .place_bid(&courier, bid(delivery.id, 14.5, 25))
            .await
            .unwrap();

        assert_eq!(
            coordinator.list_bids(&client, delivery.id).await.unwrap().len(),
            1
        );
        assert!(matches!(
            coordinator
                .list_bids(&Actor::client(Uuid::new_v4()), delivery.id)
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator.list_bids(&courier, delivery.id).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn direct_status_updates_reach_only_courier_visible_targets() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        for target in [
            DeliveryStatus::Pending,
            DeliveryStatus::Bidding,
            DeliveryStatus::Accepted,
        ] {
            let err = coordinator
                .update_status(&client, delivery.id, target)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn lifecycle_events_reach_the_tracking_subscriber() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let courier = Actor::courier(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let placed = coordinator
            .place_bid(&courier, bid(delivery.id, 14.5, 25))
            .await
            .unwrap();
        let mut watcher = coordinator
            .subscribe_tracking(&client, delivery.id)
            .await
            .unwrap();
        assert_eq!(watcher.status, DeliveryStatus::Bidding);

        coordinator
            .accept_bid(&client, delivery.id, placed.id)
            .await
            .unwrap();
        coordinator
            .update_status(&courier, delivery.id, DeliveryStatus::InProgress)
            .await
            .unwrap();
        coordinator
            .publish_location(
                &courier,
                delivery.id,
                NewLocationSample {
                    latitude: -17.82,
                    longitude: 31.05,
                    captured_at: None,
                },
            )
            .await
            .unwrap();
        coordinator
            .update_status(&courier, delivery.id, DeliveryStatus::Completed)
            .await
            .unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = watcher.events.try_recv() {
            kinds.push(match event {
                TrackingEvent::StatusChanged { status, .. } => format!("status:{status}"),
                TrackingEvent::LocationUpdate { .. } => "location".to_string(),
                TrackingEvent::Closed { .. } => "closed".to_string(),
            });
        }
        assert_eq!(
            kinds,
            vec![
                "status:accepted",
                "status:in_progress",
                "location",
                "status:completed",
                "closed",
            ]
        );

        // The channel is tombstoned once the delivery completes.
        let err = coordinator
            .publish_location(
                &courier,
                delivery.id,
                NewLocationSample {
                    latitude: -17.81,
                    longitude: 31.04,
                    captured_at: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StreamClosed));
    }

    #[tokio::test]
    async fn location_publishing_is_fenced_to_the_assigned_courier() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let courier = Actor::courier(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        let sample = NewLocationSample {
            latitude: -17.82,
            longitude: 31.05,
            captured_at: None,
        };

        // No assignment yet: the stream is not live.
        assert!(matches!(
            coordinator
                .publish_location(&courier, delivery.id, sample.clone())
                .await,
            Err(AppError::StreamClosed)
        ));

        let placed = coordinator
            .place_bid(&courier, bid(delivery.id, 14.5, 25))
            .await
            .unwrap();
        coordinator
            .accept_bid(&client, delivery.id, placed.id)
            .await
            .unwrap();

        assert!(matches!(
            coordinator
                .publish_location(&Actor::courier(Uuid::new_v4()), delivery.id, sample.clone())
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(coordinator
            .publish_location(&courier, delivery.id, sample)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn tracking_subscription_is_fenced_to_the_participants() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();

        assert!(coordinator
            .subscribe_tracking(&client, delivery.id)
            .await
            .is_ok());
        assert!(matches!(
            coordinator
                .subscribe_tracking(&Actor::courier(Uuid::new_v4()), delivery.id)
                .await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            coordinator
                .subscribe_tracking(&client, Uuid::new_v4())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn active_delivery_round_trips_through_the_assignment() {
        let coordinator = coordinator();
        let client = Actor::client(Uuid::new_v4());
        let courier = Actor::courier(Uuid::new_v4());

        assert!(matches!(
            coordinator.active_delivery(&courier),
            Err(AppError::NotFound(_))
        ));

        let delivery = coordinator.create_delivery(&client, harare_delivery()).unwrap();
        let placed = coordinator
            .place_bid(&courier, bid(delivery.id, 14.5, 25))
            .await
            .unwrap();
        coordinator
            .accept_bid(&client, delivery.id, placed.id)
            .await
            .unwrap();

        let active = coordinator.active_delivery(&courier).unwrap();
        assert_eq!(active.id, delivery.id);
    }
}
