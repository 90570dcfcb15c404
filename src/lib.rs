//! CRM API Library
//!
//! Companies, contacts, the product catalog, quotations with PDF export, orders, exhibitions,
//! tasks, notes, documents and a dashboard, served over an axum HTTP API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod reports;
pub mod services;
pub mod storage;
pub mod tracing;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::{IntoParams, ToSchema};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub cache: cache::QueryCache,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires every service onto one shared context.
    pub fn new(
        config: config::AppConfig,
        db: Arc<DatabaseConnection>,
        event_sender: Arc<events::EventSender>,
        store: Arc<dyn storage::ObjectStore>,
    ) -> Self {
        let cache = cache::QueryCache::from_config(&config.cache);
        let ctx = services::ServiceContext::new(db.clone(), cache.clone(), Some(event_sender.clone()));
        let services = handlers::AppServices::new(ctx, &config, store);
        Self {
            db,
            config,
            event_sender,
            cache,
            services,
        }
    }

    /// Normalizes list query parameters against the configured page sizes.
    pub fn page_params(&self, query: ListQuery) -> services::PageParams {
        services::PageParams::new(
            query.page,
            query.limit.unwrap_or(self.config.api_default_page_size),
            self.config.api_max_page_size,
            query.search,
        )
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["name: must not be blank".into()]) },
        )
        .await;

        assert!(!response.success);
        assert_eq!(response.errors.as_deref().map(<[String]>::len), Some(1));
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(page.total_pages, 3);

        let empty = PaginatedResponse::<u8>::new(Vec::new(), 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(handlers::companies::routes())
        .merge(handlers::contacts::routes())
        .merge(handlers::product_categories::routes())
        .merge(handlers::products::routes())
        .merge(handlers::quotations::routes())
        .merge(handlers::orders::routes())
        .merge(handlers::exhibitions::routes())
        .merge(handlers::employees::routes())
        .merge(handlers::tasks::routes())
        .merge(handlers::notes::routes())
        .merge(handlers::documents::routes())
        .merge(handlers::dictionary::routes())
        .merge(handlers::settings::routes())
        .merge(handlers::dashboard::routes())
}

/// Full application router with the HTTP middleware stack applied.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origins.as_deref());
    let body_limit = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/", get(|| async { "CRM API" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                ::tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "Service status", body = crate::ApiResponse<serde_json::Value>)),
    tag = "Health"
)]
pub async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "crm-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "cache_entries": state.cache.len(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Database connectivity", body = crate::ApiResponse<serde_json::Value>)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

// Request logging middleware
async fn request_logging_middleware(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    ::tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::*;
    pub use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};
}
