use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::identity;
use crate::models::tracking::TrackingEvent;
use crate::state::AppState;
use crate::tracking::TrackingSubscription;

#[derive(Deserialize)]
pub struct TrackingQuery {
    token: Option<String>,
}

// Browsers cannot set headers on a WebSocket handshake, so the token may
// also ride in the query string. Authorization happens before the upgrade;
// a rejected subscriber never holds a socket.
pub async fn tracking_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(delivery_id): Path<Uuid>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = identity::bearer_token(&headers)
        .or(query.token.as_deref())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
    let actor = identity::resolve_actor(token)?;

    let subscription = state
        .coordinator
        .subscribe_tracking(&actor, delivery_id)
        .await?;

    Ok(ws.on_upgrade(move |socket| stream_tracking(socket, state, delivery_id, subscription)))
}

async fn stream_tracking(
    socket: WebSocket,
    state: Arc<AppState>,
    delivery_id: Uuid,
    subscription: TrackingSubscription,
) {
    let (mut sender, mut receiver) = socket.split();
    let TrackingSubscription {
        status,
        status_changed_at,
        latest,
        closed,
        events,
    } = subscription;

    state.metrics.tracking_subscribers.inc();
    info!(delivery_id = %delivery_id, "tracking subscriber connected");

    let mut send_task = tokio::spawn(async move {
        // Join snapshot: where the delivery stands and the freshest sample.
        let mut snapshot = vec![TrackingEvent::StatusChanged {
            delivery_id,
            status,
            changed_at: status_changed_at,
        }];
        if let Some(sample) = latest {
            snapshot.push(TrackingEvent::LocationUpdate { sample });
        }
        if closed {
            snapshot.push(TrackingEvent::Closed {
                delivery_id,
                status,
            });
        }
        for event in &snapshot {
            if send_event(&mut sender, event).await.is_err() {
                return;
            }
        }
        if closed {
            return;
        }

        let mut events = BroadcastStream::new(events);
        while let Some(result) = events.next().await {
            let event = match result {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(delivery_id = %delivery_id, skipped, "tracking subscriber lagged");
                    continue;
                }
            };

            let closing = matches!(event, TrackingEvent::Closed { .. });
            if send_event(&mut sender, &event).await.is_err() {
                break;
            }
            if closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.metrics.tracking_subscribers.dec();
    info!(delivery_id = %delivery_id, "tracking subscriber disconnected");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &TrackingEvent,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(err) => {
            warn!(error = %err, "failed to serialize tracking event");
            return Ok(());
        }
    };

    sender.send(Message::Text(json.into())).await
}
