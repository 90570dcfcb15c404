mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use crm_api::entities::order;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use uuid::Uuid;

fn total_of(body: &Value) -> Decimal {
    let raw = body["data"]["total_amount"]
        .as_str()
        .unwrap_or_else(|| panic!("no total_amount in {body}"));
    Decimal::from_str(raw).expect("total_amount is a decimal string")
}

async fn stored_total(app: &TestApp, id: Uuid) -> Decimal {
    order::Entity::find_by_id(id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("order row")
        .total_amount
}

async fn create_order(app: &TestApp, company_id: Uuid) -> Uuid {
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({ "company_id": company_id, "currency": "EUR" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(total_of(&body), Decimal::ZERO);
    assert_eq!(body["data"]["status"], json!("new"));
    Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn order_item_mutations_keep_total_in_sync() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let product_id = app.seed_product("Gate valve DN50", "100").await;
    let order_id = create_order(&app, company_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/items"),
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
            &format!("/api/v1/orders/{order_id}/items"),
            Some(json!({ "description": "Installation", "quantity": "1", "unit_price": "50" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(230));
    assert_eq!(stored_total(&app, order_id).await, dec!(230));

    let valve_id = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["description"] == json!("Gate valve DN50"))
        .and_then(|item| item["id"].as_str())
        .map(str::to_string)
        .expect("valve item");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/orders/{order_id}/items/{valve_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(total_of(&response_json(response).await), dec!(50));
    assert_eq!(stored_total(&app, order_id).await, dec!(50));

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(total_of(&body), dec!(50));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["company"]["name"], json!("Buyer"));
}

#[tokio::test]
async fn order_item_errors() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let order_id = create_order(&app, company_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/items"),
            Some(json!({ "description": "Nothing", "quantity": "0", "unit_price": "10" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/orders/{order_id}/items/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(stored_total(&app, order_id).await, Decimal::ZERO);
}

#[tokio::test]
async fn order_status_update_and_delete() {
    let app = TestApp::new().await;
    let company_id = app.seed_company("Buyer").await;
    let order_id = create_order(&app, company_id).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{order_id}"),
            Some(json!({ "status": "confirmed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/orders?status=confirmed", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], json!(1));

    let response = app
        .request(Method::DELETE, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
