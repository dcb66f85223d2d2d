use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{valid_coordinates, GeoIndex};
use crate::models::actor::{Actor, Role};
use crate::models::delivery::{
    Delivery, DeliveryStatus, GeoLocation, NewDelivery, StatusChange,
};

pub struct DeliveryLedger {
    records: DashMap<Uuid, Delivery>,
    geo: Arc<GeoIndex>,
    max_price: f64,
}

impl DeliveryLedger {
    pub fn new(geo: Arc<GeoIndex>, max_price: f64) -> Self {
        Self {
            records: DashMap::new(),
            geo,
            max_price,
        }
    }

    pub fn create(&self, client_id: Uuid, new: NewDelivery) -> Result<Delivery, AppError> {
        self.validate(&new)?;

        let now = Utc::now();
        let delivery = Delivery {
            id: Uuid::new_v4(),
            client_id,
            courier_id: None,
            pickup_location: new.pickup_location,
            dropoff_location: new.dropoff_location,
            package_details: new.package_details,
            suggested_price: new.suggested_price,
            status: DeliveryStatus::Pending,
            accepted_bid_id: None,
            created_at: now,
            status_updated_at: now,
        };

        self.records.insert(delivery.id, delivery.clone());
        self.geo.insert(delivery.id, delivery.pickup_location.point());

        info!(delivery_id = %delivery.id, client_id = %client_id, "delivery created");
        Ok(delivery)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, delivery_id: Uuid) -> Result<Delivery, AppError> {
        self.records
            .get(&delivery_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))
    }

    // Narrow status view for the bid ledger: no record details leak out.
    pub fn status_of(&self, delivery_id: Uuid) -> Result<DeliveryStatus, AppError> {
        self.records
            .get(&delivery_id)
            .map(|entry| entry.value().status)
            .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))
    }

    pub fn list_for_client(&self, client_id: Uuid) -> Vec<Delivery> {
        let mut deliveries: Vec<Delivery> = self
            .records
            .iter()
            .filter(|entry| entry.value().client_id == client_id)
            .map(|entry| entry.value().clone())
            .collect();

        deliveries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        deliveries
    }

    pub fn active_for_courier(&self, courier_id: Uuid) -> Option<Delivery> {
        self.records
            .iter()
            .find(|entry| {
                let delivery = entry.value();
                delivery.courier_id == Some(courier_id)
                    && matches!(
                        delivery.status,
                        DeliveryStatus::Accepted | DeliveryStatus::InProgress
                    )
            })
            .map(|entry| entry.value().clone())
    }

    pub fn transition(
        &self,
        delivery_id: Uuid,
        change: StatusChange,
        actor: &Actor,
    ) -> Result<Delivery, AppError> {
        let updated = {
            let mut entry = self
                .records
                .get_mut(&delivery_id)
                .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))?;
            let delivery = entry.value_mut();
            let from = delivery.status;
            let to = change.target();

            // Transition-table legality comes before the actor check, so a
            // state conflict reads as a conflict regardless of who asked.
            if !transition_allowed(from, &change) {
                return Err(AppError::InvalidTransition { from, to });
            }
            authorize_transition(delivery, &change, actor)?;

            match change {
                StatusChange::Accepted {
                    courier_id,
                    accepted_bid_id,
                } => {
                    delivery.courier_id = Some(courier_id);
                    delivery.accepted_bid_id = Some(accepted_bid_id);
                }
                // Cancellation revokes the assignment; the winning bid stays
                // in the bid ledger as the audit record.
                StatusChange::Cancelled => {
                    delivery.courier_id = None;
                    delivery.accepted_bid_id = None;
                }
                _ => {}
            }
            delivery.status = to;
            delivery.status_updated_at = Utc::now();
            delivery.clone()
        };

        if !updated.status.is_open() {
            self.geo.remove(delivery_id);
        }

        info!(
            delivery_id = %delivery_id,
            to = %updated.status,
            actor_id = %actor.user_id,
            "delivery transitioned"
        );
        Ok(updated)
    }

    fn validate(&self, new: &NewDelivery) -> Result<(), AppError> {
        validate_location(&new.pickup_location, "pickup_location")?;
        validate_location(&new.dropoff_location, "dropoff_location")?;

        if new.package_details.description.trim().is_empty() {
            return Err(AppError::Validation(
                "package description cannot be empty".to_string(),
            ));
        }

        if let Some(weight) = new.package_details.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::Validation(
                    "package weight must be zero or positive".to_string(),
                ));
            }
        }

        if let Some(price) = new.suggested_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(AppError::Validation(
                    "suggested price must be positive".to_string(),
                ));
            }
            if price > self.max_price {
                return Err(AppError::Validation(format!(
                    "suggested price exceeds the {} limit",
                    self.max_price
                )));
            }
        }

        Ok(())
    }
}

fn validate_location(location: &GeoLocation, field: &str) -> Result<(), AppError> {
    if !valid_coordinates(location.latitude, location.longitude) {
        return Err(AppError::Validation(format!(
            "{field} coordinates out of range"
        )));
    }
    if location.address.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} address is required")));
    }
    Ok(())
}

fn transition_allowed(from: DeliveryStatus, change: &StatusChange) -> bool {
    matches!(
        (from, change),
        (DeliveryStatus::Pending, StatusChange::Bidding)
            | (DeliveryStatus::Pending, StatusChange::Cancelled)
            | (DeliveryStatus::Bidding, StatusChange::Accepted { .. })
            | (DeliveryStatus::Bidding, StatusChange::Cancelled)
            | (DeliveryStatus::Accepted, StatusChange::InProgress)
            | (DeliveryStatus::Accepted, StatusChange::Cancelled)
            | (DeliveryStatus::InProgress, StatusChange::Completed)
            | (DeliveryStatus::InProgress, StatusChange::Cancelled)
    )
}

fn authorize_transition(
    delivery: &Delivery,
    change: &StatusChange,
    actor: &Actor,
) -> Result<(), AppError> {
    match change {
        StatusChange::Bidding => {
            if actor.role != Role::Courier {
                return Err(AppError::Unauthorized(
                    "only a bidding courier opens the bidding window".to_string(),
                ));
            }
        }
        StatusChange::Accepted { .. } => {
            if actor.user_id != delivery.client_id {
                return Err(AppError::Unauthorized(
                    "only the delivery's client may accept a bid".to_string(),
                ));
            }
        }
        StatusChange::InProgress | StatusChange::Completed => {
            if delivery.courier_id != Some(actor.user_id) {
                return Err(AppError::Unauthorized(
                    "only the assigned courier may update delivery progress".to_string(),
                ));
            }
        }
        StatusChange::Cancelled => {
            let is_client = actor.user_id == delivery.client_id;
            let is_assigned_courier = delivery.courier_id == Some(actor.user_id);
            let allowed = if delivery.status.is_open() {
                is_client
            } else {
                is_client || is_assigned_courier
            };
            if !allowed {
                return Err(AppError::Unauthorized(
                    "cancellation is limited to the client or the assigned courier".to_string(),
                ));
            }
        }
    }
    Ok(())
}
