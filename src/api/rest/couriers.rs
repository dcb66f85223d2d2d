use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::matching::DiscoveredJob;
use crate::models::actor::Actor;
use crate::models::bid::{Bid, NewBid};
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::models::tracking::{LocationSample, NewLocationSample};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", get(discover_jobs))
        .route("/bids", post(place_bid).get(list_my_bids))
        .route("/deliveries/:id/status", patch(update_status))
        .route("/deliveries/:id/location", patch(publish_location))
}

#[derive(Deserialize)]
pub struct JobsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DeliveryStatus,
}

async fn discover_jobs(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<JobsQuery>,
) -> Result<Json<Vec<DiscoveredJob>>, AppError> {
    let jobs = state.coordinator.discover_jobs(
        &actor,
        query.latitude,
        query.longitude,
        query.radius_km,
    )?;
    Ok(Json(jobs))
}

async fn place_bid(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<NewBid>,
) -> Result<(StatusCode, Json<Bid>), AppError> {
    let bid = state.coordinator.place_bid(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

async fn list_my_bids(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<Vec<Bid>>, AppError> {
    Ok(Json(state.coordinator.list_my_bids(&actor)?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = state
        .coordinator
        .update_status(&actor, id, payload.status)
        .await?;
    Ok(Json(delivery))
}

async fn publish_location(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewLocationSample>,
) -> Result<Json<LocationSample>, AppError> {
    let sample = state.coordinator.publish_location(&actor, id, payload).await?;
    Ok(Json(sample))
}
