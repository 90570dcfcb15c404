#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use crm_api::{
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    storage,
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up the application against an in-memory SQLite database and a
/// temporary document store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _storage_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application after letting the caller tweak the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let storage_dir = tempfile::tempdir().expect("failed to create storage dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.storage.root_dir = storage_dir.path().to_path_buf();
        cfg.storage.bucket = "test-docs".to_string();
        adjust(&mut cfg);

        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let store = storage::open_store(&cfg.storage)
            .await
            .expect("failed to create document store");

        let state = AppState::new(cfg, Arc::new(pool), event_sender, store);
        let router = crm_api::app_router(state.clone());

        Self {
            router,
            state,
            _storage_dir: storage_dir,
            _event_task: event_task,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    /// Send a raw body, e.g. a document upload.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a company through the API and returns its id.
    pub async fn seed_company(&self, name: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/companies",
                Some(json!({ "name": name, "address": "Main St 1", "city": "Gdansk" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        data_id(response).await
    }

    /// Creates an active product through the API and returns its id.
    pub async fn seed_product(&self, name: &str, price: &str) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/products",
                Some(json!({ "name": name, "unit_price": price, "currency": "EUR" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        data_id(response).await
    }

    /// Creates an empty EUR quotation for `company_id` and returns its id.
    pub async fn seed_quotation(&self, company_id: Uuid) -> Uuid {
        let response = self
            .request(
                Method::POST,
                "/api/v1/quotations",
                Some(json!({ "company_id": company_id, "currency": "EUR", "title": "Offer" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        data_id(response).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

/// Reads `data.id` from an `ApiResponse` envelope.
pub async fn data_id(response: Response) -> Uuid {
    let body = response_json(response).await;
    body["data"]["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(|| panic!("response has no data.id: {body}"))
}
