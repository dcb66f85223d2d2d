use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::actor::Actor;

// The external identity collaborator resolves credentials ahead of this
// core; what reaches us is its output, transported as "<role>:<user id>".
// Anything else is rejected without interpretation.
pub fn resolve_actor(token: &str) -> Result<Actor, AppError> {
    let (role, user_id) = token
        .split_once(':')
        .ok_or_else(|| AppError::Unauthorized("malformed actor token".to_string()))?;

    let user_id = Uuid::parse_str(user_id)
        .map_err(|_| AppError::Unauthorized("invalid user id in actor token".to_string()))?;

    match role {
        "client" => Ok(Actor::client(user_id)),
        "courier" => Ok(Actor::courier(user_id)),
        other => Err(AppError::Unauthorized(format!(
            "unknown actor role: {other}"
        ))),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        resolve_actor(token)
    }
}
