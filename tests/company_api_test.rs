mod common;

use axum::http::{Method, StatusCode};
use common::{data_id, response_json, TestApp};
use crm_api::entities::company;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn blank_company_name_is_rejected_without_writing_a_row() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/companies",
            Some(json!({ "name": "   ", "city": "Poznan" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("name"), "unexpected message: {message}");

    let rows = company::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn company_crud_round_trip() {
    let app = TestApp::new().await;
    let actor = Uuid::new_v4();

    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/companies",
            Some(json!({ "name": "Acme Sp. z o.o.", "email": "office@acme.test", "city": "Gdynia" })),
            &[("x-actor-id", &actor.to_string())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["created_by"], json!(actor.to_string()));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/companies/{id}"),
            Some(json!({ "city": "Sopot" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Served from the cache before the update; the update must have invalidated it.
    let response = app
        .request(Method::GET, &format!("/api/v1/companies/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["city"], json!("Sopot"));
    assert_eq!(body["data"]["name"], json!("Acme Sp. z o.o."));

    let response = app
        .request(Method::DELETE, &format!("/api/v1/companies/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/companies/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_paginated_and_searchable() {
    let app = TestApp::new().await;
    for name in ["Alpha Metal", "Beta Wood", "Gamma Metal"] {
        app.seed_company(name).await;
    }

    let response = app
        .request(Method::GET, "/api/v1/companies?page=1&limit=2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(3));
    assert_eq!(body["data"]["total_pages"], json!(2));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/v1/companies?search=Metal", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(2));

    // A new company must show up in a previously cached listing.
    app.seed_company("Delta Metal").await;
    let response = app
        .request(Method::GET, "/api/v1/companies?search=Metal", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(3));
}

#[tokio::test]
async fn company_with_quotations_cannot_be_deleted() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Busy Buyer").await;
    app.seed_quotation(company_id).await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/companies/{company_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn contacts_are_listed_under_their_company() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Contactful").await;
    let other_id = app.seed_company("Other").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/contacts",
            Some(json!({ "company_id": company_id, "first_name": "Jan", "last_name": "Kowalski", "email": "jan@contactful.test" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let contact_id = data_id(response).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/companies/{company_id}/contacts"),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["id"], json!(contact_id.to_string()));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/contacts?company_id={other_id}"),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(0));
}

#[tokio::test]
async fn malformed_actor_header_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/companies",
            Some(json!({ "name": "Anyone" })),
            &[("x-actor-id", "not-a-uuid")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_status_report_ok() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = response_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));

    let response = app.request(Method::GET, "/api/v1/status", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["service"], json!("crm-api"));
}
