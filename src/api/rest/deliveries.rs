use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::actor::Actor;
use crate::models::bid::Bid;
use crate::models::delivery::{Delivery, NewDelivery};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(create_delivery).get(list_my_deliveries))
        .route("/deliveries/active", get(active_delivery))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/:id/bids", get(list_bids))
        .route("/deliveries/:id/accept-bid", post(accept_bid))
        .route("/deliveries/:id/cancel", post(cancel_delivery))
}

#[derive(Deserialize)]
pub struct AcceptBidRequest {
    pub bid_id: Uuid,
}

#[derive(Serialize)]
pub struct AcceptBidResponse {
    pub bid: Bid,
    pub delivery: Delivery,
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<NewDelivery>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    let delivery = state.coordinator.create_delivery(&actor, payload)?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn list_my_deliveries(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<Vec<Delivery>>, AppError> {
    Ok(Json(state.coordinator.list_my_deliveries(&actor)?))
}

async fn active_delivery(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.coordinator.active_delivery(&actor)?))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.coordinator.get_delivery(id)?))
}

async fn list_bids(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, AppError> {
    Ok(Json(state.coordinator.list_bids(&actor, id).await?))
}

async fn accept_bid(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptBidRequest>,
) -> Result<Json<AcceptBidResponse>, AppError> {
    let (bid, delivery) = state.coordinator.accept_bid(&actor, id, payload.bid_id).await?;
    Ok(Json(AcceptBidResponse { bid, delivery }))
}

async fn cancel_delivery(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(state.coordinator.cancel_delivery(&actor, id).await?))
}
