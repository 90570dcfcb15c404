mod common;

use axum::http::{Method, StatusCode};
use common::{data_id, response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn settings_are_upserted_by_key() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/settings/quote.validity_days",
            Some(json!({ "value": 30, "description": "Default quotation validity" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let first_id = body["data"]["id"].clone();
    assert_eq!(body["data"]["value"], json!(30));

    let response = app
        .request(
            Method::PUT,
            "/api/v1/settings/quote.validity_days",
            Some(json!({ "value": 45 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["id"], first_id);
    assert_eq!(body["data"]["value"], json!(45));
    assert_eq!(body["data"]["description"], json!("Default quotation validity"));

    let response = app
        .request(Method::GET, "/api/v1/settings/quote.validity_days", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["value"], json!(45));

    let response = app.request(Method::GET, "/api/v1/settings", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .request(Method::DELETE, "/api/v1/settings/quote.validity_days", None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .request(Method::GET, "/api/v1/settings/quote.validity_days", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn setting_key_and_company_profile_are_validated() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/settings/bad%20key",
            Some(json!({ "value": true })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            "/api/v1/settings/company_profile",
            Some(json!({ "value": "not an object" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhibition_dates_must_be_ordered() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/exhibitions",
            Some(json!({ "name": "Hannover Messe", "start_date": "2026-04-20", "end_date": "2026-04-19" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/api/v1/exhibitions",
            Some(json!({ "name": "Hannover Messe", "start_date": "2026-04-20", "end_date": "2026-04-24" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let exhibition_id = data_id(response).await;

    // Moving the start past the stored end is rejected too.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/exhibitions/{exhibition_id}"),
            Some(json!({ "start_date": "2026-04-25" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::GET, &format!("/api/v1/exhibitions/{exhibition_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["start_date"], json!("2026-04-20"));
}

#[tokio::test]
async fn exhibition_costs_round_trip() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/exhibitions",
            Some(json!({ "name": "Poleko", "start_date": "2026-10-06", "end_date": "2026-10-09" })),
        )
        .await;
    let exhibition_id = data_id(response).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/exhibitions/{exhibition_id}/costs"),
            Some(json!({ "category": "booth", "amount": "1200.50", "currency": "EUR" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cost_id = data_id(response).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/exhibitions/{exhibition_id}/costs"),
            Some(json!({ "category": "travel", "amount": "-5", "currency": "EUR" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/exhibitions/{exhibition_id}/costs"),
            None,
        )
        .await;
    let body = response_json(response).await;
    let costs = body["data"].as_array().unwrap();
    assert_eq!(costs.len(), 1);
    assert_eq!(costs[0]["category"], json!("booth"));

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/exhibitions/{exhibition_id}/costs/{cost_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/exhibitions/{exhibition_id}/costs"),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tasks_are_filtered_by_status_and_company() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Follow-up").await;

    for (title, status, company) in [
        ("Call back", "todo", Some(company_id)),
        ("Send offer", "done", Some(company_id)),
        ("Order samples", "todo", None),
    ] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/tasks",
                Some(json!({ "title": title, "status": status, "company_id": company })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.request(Method::GET, "/api/v1/tasks?status=todo", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(2));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/tasks?status=todo&company_id={company_id}"),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["items"][0]["title"], json!("Call back"));

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks",
            Some(json!({ "title": "  " })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
