mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{response_bytes, response_json, TestApp};
use crm_api::entities::{order, quotation};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use uuid::Uuid;

fn total_of(body: &Value) -> Decimal {
    let raw = body["data"]["total_amount"]
        .as_str()
        .unwrap_or_else(|| panic!("no total_amount in {body}"));
    Decimal::from_str(raw).expect("total_amount is a decimal string")
}

async fn stored_total(app: &TestApp, id: Uuid) -> Decimal {
    quotation::Entity::find_by_id(id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("quotation row")
        .total_amount
}

#[tokio::test]
async fn item_mutations_keep_total_in_sync() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let product_id = app.seed_product("Gate valve DN50", "100").await;
    let quotation_id = app.seed_quotation(company_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/items"),
            Some(json!({ "product_id": product_id, "quantity": "2", "discount": "10" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(180));
    assert_eq!(body["data"]["items"][0]["description"], json!("Gate valve DN50"));

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/items"),
            Some(json!({ "description": "Installation", "quantity": "1", "unit_price": "50" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(230));
    assert_eq!(stored_total(&app, quotation_id).await, dec!(230));

    let installation_id = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["description"] == json!("Installation"))
        .and_then(|item| item["id"].as_str())
        .map(str::to_string)
        .expect("installation item");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/quotations/{quotation_id}/items/{installation_id}"),
            Some(json!({ "quantity": "3" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(total_of(&response_json(response).await), dec!(330));

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/quotations/{quotation_id}/items/{installation_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(total_of(&response_json(response).await), dec!(180));
    assert_eq!(stored_total(&app, quotation_id).await, dec!(180));

    // The detail read goes through the cache; it must reflect the last mutation.
    let response = app
        .request(Method::GET, &format!("/api/v1/quotations/{quotation_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(180));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["company"]["name"], json!("Buyer"));
}

#[tokio::test]
async fn quotation_created_with_items_has_total() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/quotations",
            Some(json!({
                "company_id": company_id,
                "currency": "EUR",
                "items": [
                    { "description": "Pump", "quantity": "2", "unit_price": "100", "discount": "10" },
                    { "description": "Service", "quantity": "1", "unit_price": "50" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(total_of(&response_json(response).await), dec!(230));
}

#[tokio::test]
async fn invalid_item_is_rejected() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let quotation_id = app.seed_quotation(company_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/items"),
            Some(json!({ "description": "Broken", "quantity": "1", "unit_price": "10", "discount": "150" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{}/items", Uuid::new_v4()),
            Some(json!({ "description": "Orphan", "quantity": "1", "unit_price": "10" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pdf_for_empty_quotation_renders() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let quotation_id = app.seed_quotation(company_id).await;

    let response = app
        .request(Method::GET, &format!("/api/v1/quotations/{quotation_id}/pdf"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains(".pdf"));

    let bytes = response_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn pdf_for_missing_quotation_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, &format!("/api/v1/quotations/{}/pdf", Uuid::new_v4()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversion_creates_order_once() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let quotation_id = app.seed_quotation(company_id).await;

    for (description, quantity, price, discount) in
        [("Pump", "2", "100", "10"), ("Service", "1", "50", "0")]
    {
        let response = app
            .request(
                Method::POST,
                &format!("/api/v1/quotations/{quotation_id}/items"),
                Some(json!({
                    "description": description,
                    "quantity": quantity,
                    "unit_price": price,
                    "discount": discount,
                    "parameters": { "voltage": "230V" }
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/convert"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(230));
    assert_eq!(body["data"]["status"], json!("new"));
    assert_eq!(body["data"]["quotation_id"], json!(quotation_id.to_string()));
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| item["description"].as_str().unwrap_or_default().contains("voltage")));

    let stored = quotation::Entity::find_by_id(quotation_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, quotation::QuotationStatus::Accepted);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/convert"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let orders = order::Entity::find()
        .filter(order::Column::QuotationId.eq(quotation_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn rejected_quotation_cannot_be_converted() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let quotation_id = app.seed_quotation(company_id).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/quotations/{quotation_id}"),
            Some(json!({ "status": "rejected" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/quotations/{quotation_id}/convert"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
