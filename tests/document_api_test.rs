mod common;

use axum::http::{Method, StatusCode};
use common::{response_bytes, response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn upload_download_and_delete() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Paperwork").await;
    let content = b"%PDF-1.4 signed contract".to_vec();

    let response = app
        .request_raw(
            Method::POST,
            &format!("/api/v1/documents?file_name=contract.pdf&company_id={company_id}"),
            "application/pdf",
            content.clone(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["file_name"], json!("contract.pdf"));
    assert_eq!(body["data"]["size_bytes"], json!(content.len()));
    assert_eq!(body["data"]["company_id"], json!(company_id.to_string()));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(Method::GET, &format!("/api/v1/documents/{id}/content"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert!(response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .contains("contract.pdf"));
    assert_eq!(response_bytes(response).await, content);

    let response = app
        .request(Method::GET, &format!("/api/v1/documents?company_id={company_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(1));

    let response = app
        .request(Method::DELETE, &format!("/api/v1/documents/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/documents/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .request(Method::GET, &format!("/api/v1/documents/{id}/content"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/documents?file_name=empty.txt",
            "text/plain",
            Vec::new(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::with_config(|cfg| cfg.storage.max_upload_bytes = 16).await;
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/documents?file_name=big.bin",
            "application/octet-stream",
            vec![7u8; 64],
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.headers().contains_key("x-request-id"));
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Payload Too Large"));
    assert!(
        body["message"].as_str().unwrap_or_default().contains("16 bytes"),
        "unexpected body: {body}"
    );
    assert!(body["request_id"].is_string());

    let response = app.request(Method::GET, "/api/v1/documents", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(0));
}
