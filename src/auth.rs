//! # Actor Identity
//!
//! The service sits behind a gateway that authenticates users and forwards
//! their identity as trusted headers. This module turns those headers into
//! an [`Actor`] and exposes it as an axum extractor; role-based decisions
//! happen in the workflow layer.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{ApiError, unauthorized, validation_error};
use crate::workflow::{Actor, Role};

/// Header carrying the authenticated user's id.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
/// Header carrying the authenticated user's role.
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Parse the actor identity out of the forwarded headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id_value = headers
        .get(ACTOR_ID_HEADER)
        .ok_or_else(|| unauthorized(Some("Missing X-Actor-Id header")))?
        .to_str()
        .map_err(|_| {
            validation_error(
                "Invalid actor header",
                serde_json::json!({ ACTOR_ID_HEADER: "Header must be valid UTF-8" }),
            )
        })?;

    let id = id_value.parse::<Uuid>().map_err(|_| {
        validation_error(
            "Invalid actor id",
            serde_json::json!({ ACTOR_ID_HEADER: "Must be a valid UUID" }),
        )
    })?;

    let role_value = headers
        .get(ACTOR_ROLE_HEADER)
        .ok_or_else(|| unauthorized(Some("Missing X-Actor-Role header")))?
        .to_str()
        .map_err(|_| {
            validation_error(
                "Invalid actor header",
                serde_json::json!({ ACTOR_ROLE_HEADER: "Header must be valid UTF-8" }),
            )
        })?;

    let role = role_value.parse::<Role>().map_err(|_| {
        validation_error(
            "Invalid actor role",
            serde_json::json!({
                ACTOR_ROLE_HEADER: "Must be one of bd_team, manager, superuser, admin"
            }),
        )
    })?;

    Ok(Actor { id, role })
}

impl<S> FromRequestParts<S> for Actor
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
    }
}

/// OpenAPI header parameters for the actor identity.
#[derive(Debug, Serialize, Deserialize, IntoParams, utoipa::ToSchema)]
#[into_params(parameter_in = Header)]
pub struct ActorHeaders {
    /// Authenticated user id (UUID)
    #[serde(rename = "X-Actor-Id")]
    #[param(rename = "X-Actor-Id", value_type = String)]
    pub actor_id: String,
    /// Authenticated user role: bd_team, manager, superuser, or admin
    #[serde(rename = "X-Actor-Role")]
    #[param(rename = "X-Actor-Role", value_type = String)]
    pub actor_role: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        headers
    }

    #[test]
    fn valid_headers_produce_actor() {
        let id = Uuid::new_v4();
        let actor = actor_from_headers(&headers(&id.to_string(), "manager")).unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, Role::Manager);
    }

    #[test]
    fn missing_actor_id_is_unauthorized() {
        let mut partial = HeaderMap::new();
        partial.insert(ACTOR_ROLE_HEADER, HeaderValue::from_static("manager"));
        let err = actor_from_headers(&partial).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn malformed_actor_id_is_rejected() {
        let err = actor_from_headers(&headers("not-a-uuid", "manager")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let id = Uuid::new_v4().to_string();
        let err = actor_from_headers(&headers(&id, "intern")).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
