use crate::{errors::ServiceError, ApiResponse};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

/// Header carrying the id of the user performing the request, set by the upstream auth layer.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Restricts a list to rows of one company.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CompanyScope {
    pub company_id: Option<Uuid>,
}

/// Optional creator reference taken from `X-Actor-Id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Actor(None));
        };
        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(|id| Actor(Some(id)))
            .ok_or_else(|| ServiceError::BadRequest(format!("{ACTOR_HEADER} must be a UUID")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Actor, ServiceError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_header_means_anonymous() {
        assert_eq!(extract(None).await.unwrap(), Actor(None));
    }

    #[tokio::test]
    async fn valid_header_is_parsed() {
        let id = Uuid::new_v4();
        assert_eq!(extract(Some(&id.to_string())).await.unwrap(), Actor(Some(id)));
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        let err = extract(Some("admin")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
