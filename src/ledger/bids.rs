use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::ledger::deliveries::DeliveryLedger;
use crate::models::actor::Actor;
use crate::models::bid::{Bid, BidStatus, NewBid};
use crate::models::delivery::{Delivery, DeliveryStatus, StatusChange};

pub struct BidLedger {
    records: DashMap<Uuid, Bid>,
    by_delivery: DashMap<Uuid, Vec<Uuid>>,
    by_courier: DashMap<Uuid, Vec<Uuid>>,
    deliveries: Arc<DeliveryLedger>,
}

impl BidLedger {
    pub fn new(deliveries: Arc<DeliveryLedger>) -> Self {
        Self {
            records: DashMap::new(),
            by_delivery: DashMap::new(),
            by_courier: DashMap::new(),
            deliveries,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Caller holds the delivery's exclusive gate, so the status check, the
    // first-bid transition and the insert cannot interleave with an accept.
    pub fn submit(&self, actor: &Actor, new: NewBid) -> Result<Bid, AppError> {
        validate_bid(&new)?;

        let status = self.deliveries.status_of(new.delivery_id)?;
        if !status.is_open() {
            return Err(AppError::DeliveryNotOpen(status));
        }
        if status == DeliveryStatus::Pending {
            self.deliveries
                .transition(new.delivery_id, StatusChange::Bidding, actor)?;
        }

        let bid = Bid {
            id: Uuid::new_v4(),
            delivery_id: new.delivery_id,
            courier_id: actor.user_id,
            amount: new.amount,
            estimated_time_minutes: new.estimated_time_minutes,
            message: new.message,
            vehicle_info: new.vehicle_info,
            status: BidStatus::Pending,
            created_at: Utc::now(),
        };

        self.records.insert(bid.id, bid.clone());
        self.by_delivery
            .entry(bid.delivery_id)
            .or_default()
            .push(bid.id);
        self.by_courier
            .entry(bid.courier_id)
            .or_default()
            .push(bid.id);

        info!(
            bid_id = %bid.id,
            delivery_id = %bid.delivery_id,
            courier_id = %bid.courier_id,
            amount = bid.amount,
            "bid submitted"
        );
        Ok(bid)
    }

    // Display ranking: cheapest first, earliest bid wins a price tie.
    pub fn list_for_delivery(&self, delivery_id: Uuid) -> Vec<Bid> {
        let ids = self
            .by_delivery
            .get(&delivery_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut bids: Vec<Bid> = ids
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|entry| entry.value().clone()))
            .collect();

        bids.sort_by(|a, b| {
            a.amount
                .total_cmp(&b.amount)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        bids
    }

    pub fn list_for_courier(&self, courier_id: Uuid) -> Vec<Bid> {
        let ids = self
            .by_courier
            .get(&courier_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut bids: Vec<Bid> = ids
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|entry| entry.value().clone()))
            .collect();

        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        bids
    }

    // The acceptance transaction. Caller holds the delivery's exclusive
    // gate; every check passes before the first mutation, and the delivery
    // transition lands before the bid flips, so no failure path can leave a
    // half-accepted ledger behind.
    pub fn accept(
        &self,
        actor: &Actor,
        delivery_id: Uuid,
        bid_id: Uuid,
    ) -> Result<(Bid, Delivery), AppError> {
        let delivery = self.deliveries.get(delivery_id)?;
        if actor.user_id != delivery.client_id {
            return Err(AppError::Unauthorized(
                "only the delivery's client may accept a bid".to_string(),
            ));
        }
        if delivery.status != DeliveryStatus::Bidding {
            return Err(AppError::DeliveryNotBidding(delivery.status));
        }

        let winning = self
            .records
            .get(&bid_id)
            .map(|entry| entry.value().clone())
            .filter(|bid| bid.delivery_id == delivery_id && bid.status == BidStatus::Pending)
            .ok_or(AppError::BidNotFound(bid_id))?;

        let delivery = self.deliveries.transition(
            delivery_id,
            StatusChange::Accepted {
                courier_id: winning.courier_id,
                accepted_bid_id: winning.id,
            },
            actor,
        )?;

        let siblings = self
            .by_delivery
            .get(&delivery_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        for id in siblings {
            if let Some(mut entry) = self.records.get_mut(&id) {
                let bid = entry.value_mut();
                if bid.id == winning.id {
                    bid.status = BidStatus::Accepted;
                } else if bid.status == BidStatus::Pending {
                    bid.status = BidStatus::Rejected;
                }
            }
        }

        let accepted = self
            .records
            .get(&winning.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Internal(format!("accepted bid {bid_id} vanished")))?;

        info!(
            bid_id = %accepted.id,
            delivery_id = %delivery_id,
            courier_id = %accepted.courier_id,
            amount = accepted.amount,
            "bid accepted"
        );
        Ok((accepted, delivery))
    }
}

fn validate_bid(new: &NewBid) -> Result<(), AppError> {
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(AppError::Validation(
            "bid amount must be positive".to_string(),
        ));
    }
    if new.estimated_time_minutes == 0 {
        return Err(AppError::Validation(
            "estimated time must be at least one minute".to_string(),
        ));
    }
    if let Some(vehicle) = &new.vehicle_info {
        if vehicle.model.trim().is_empty() || vehicle.plate_number.trim().is_empty() {
            return Err(AppError::Validation(
                "vehicle info requires a model and a plate number".to_string(),
            ));
        }
    }
    Ok(())
}
