use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::{DbErr, RuntimeErr, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "Validation error: name: Company name is required",
    "details": null,
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable message, suitable for a transient notification
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(flatten_validation_errors(&err).join("; "))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<crate::storage::StorageError> for ServiceError {
    fn from(err: crate::storage::StorageError) -> Self {
        match err {
            crate::storage::StorageError::NotFound(key) => {
                ServiceError::NotFound(format!("Stored object {key} not found"))
            }
            crate::storage::StorageError::InvalidKey(key) => {
                ServiceError::BadRequest(format!("Invalid storage key: {key}"))
            }
            other => ServiceError::StorageError(other.to_string()),
        }
    }
}

impl From<crate::reports::ReportError> for ServiceError {
    fn from(err: crate::reports::ReportError) -> Self {
        ServiceError::ReportError(err.to_string())
    }
}

/// Renders validator errors as `field: message` strings.
pub fn flatten_validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages
}

impl ServiceError {
    /// Maps a database error, turning unique/foreign key violations into user-facing variants.
    pub fn from_db(err: DbErr, context: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("{context} already exists"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                ServiceError::ValidationError(format!("{context} references a missing record"))
            }
            _ => match err {
                DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
                DbErr::Query(RuntimeErr::Internal(msg)) if msg.contains("UNIQUE") => {
                    ServiceError::Conflict(format!("{context} already exists"))
                }
                other => ServiceError::DatabaseError(other),
            },
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{entity} with ID {id} not found"))
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DatabaseError(_)
            | Self::StorageError(_)
            | Self::ReportError(_)
            | Self::CacheError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::StorageError(_) => "Document storage error".to_string(),
            Self::ReportError(_) => "Failed to generate document".to_string(),
            Self::CacheError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_)
            | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

pub type AppError = ServiceError;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::to_bytes;
    use rstest::rstest;
    use validator::Validate;

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("missing".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Not found: missing");
    }

    #[rstest]
    #[case(ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND)]
    #[case(ServiceError::ValidationError("x".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::Conflict("x".into()), StatusCode::CONFLICT)]
    #[case(ServiceError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE)]
    #[case(ServiceError::DatabaseError(DbErr::Custom("boom".into())), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ServiceError::StorageError("disk".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_mapping(#[case] error: ServiceError, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[test]
    fn internal_errors_hide_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("select * from secrets".into()))
                .response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::StorageError("/var/lib/crm/bucket".into()).response_message(),
            "Document storage error"
        );
        assert_eq!(
            ServiceError::ValidationError("Invalid email".into()).response_message(),
            "Validation error: Invalid email"
        );
    }

    #[derive(Validate)]
    struct SignupForm {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn validation_errors_are_flattened_per_field() {
        let err = SignupForm {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let service_error = ServiceError::from(err);
        assert_eq!(
            service_error.to_string(),
            "Validation error: name: Name is required"
        );
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = ServiceError::from_db(DbErr::RecordNotFound("gone".into()), "Company");
        assert_matches!(err, ServiceError::NotFound(_));
    }
}
