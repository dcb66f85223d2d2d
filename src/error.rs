use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::delivery::DeliveryStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bid {0} not found for this delivery")]
    BidNotFound(Uuid),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("delivery is no longer open for bids (status: {0})")]
    DeliveryNotOpen(DeliveryStatus),

    #[error("delivery is not in the bidding state (status: {0})")]
    DeliveryNotBidding(DeliveryStatus),

    #[error("tracking stream is closed")]
    StreamClosed,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    // Machine-readable discriminator so external callers can branch on the
    // failure family without parsing the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::BidNotFound(_) => "bid_not_found",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::DeliveryNotOpen(_) => "delivery_not_open",
            AppError::DeliveryNotBidding(_) => "delivery_not_bidding",
            AppError::StreamClosed => "stream_closed",
            AppError::Internal(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::BidNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. }
            | AppError::DeliveryNotOpen(_)
            | AppError::DeliveryNotBidding(_) => StatusCode::CONFLICT,
            AppError::StreamClosed => StatusCode::GONE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
