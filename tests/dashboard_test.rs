mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use common::{response_json, TestApp};
use crm_api::entities::{company, order, quotation};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

async fn insert_company(app: &TestApp, name: &str, created_at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    company::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    id
}

async fn insert_quotation(
    app: &TestApp,
    company_id: Uuid,
    total: Decimal,
    currency: &str,
    created_at: DateTime<Utc>,
) {
    let id = Uuid::new_v4();
    quotation::ActiveModel {
        id: Set(id),
        quotation_number: Set(format!("Q-{}", id.simple())),
        company_id: Set(company_id),
        status: Set(quotation::QuotationStatus::Draft),
        currency: Set(currency.to_string()),
        total_amount: Set(total),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
}

async fn insert_order(
    app: &TestApp,
    company_id: Uuid,
    total: Decimal,
    currency: &str,
    created_at: DateTime<Utc>,
) {
    let id = Uuid::new_v4();
    order::ActiveModel {
        id: Set(id),
        order_number: Set(format!("O-{}", id.simple())),
        company_id: Set(company_id),
        status: Set(order::OrderStatus::New),
        currency: Set(currency.to_string()),
        order_date: Set(created_at.date_naive()),
        total_amount: Set(total),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
}

#[tokio::test]
async fn windows_are_half_open_and_amounts_converted() {
    let app = TestApp::new().await;
    let now = at(2026, 6, 15, 12, 0, 0);

    let buyer = insert_company(&app, "Month start", at(2026, 6, 1, 0, 0, 0)).await;
    insert_company(&app, "Last second of May", at(2026, 5, 31, 23, 59, 59)).await;
    insert_company(&app, "Next month", at(2026, 7, 1, 0, 0, 0)).await;
    insert_company(&app, "Last year", at(2025, 12, 31, 23, 59, 59)).await;
    insert_company(&app, "Next year", at(2027, 1, 1, 0, 0, 0)).await;

    insert_quotation(&app, buyer, dec!(100), "EUR", at(2026, 6, 10, 9, 0, 0)).await;
    insert_quotation(&app, buyer, dec!(1000), "PLN", at(2026, 3, 1, 9, 0, 0)).await;
    insert_quotation(&app, buyer, dec!(5), "XYZ", at(2026, 6, 11, 9, 0, 0)).await;
    insert_quotation(&app, buyer, dec!(999), "EUR", at(2025, 6, 10, 9, 0, 0)).await;

    insert_order(&app, buyer, dec!(100), "USD", at(2026, 6, 2, 8, 0, 0)).await;
    insert_order(&app, buyer, dec!(40), "EUR", at(2026, 1, 1, 0, 0, 0)).await;

    let summary = app.state.services.dashboard.summary_at(now).await.unwrap();

    assert_eq!(summary.reference_currency, "EUR");
    assert_eq!(summary.counts.companies, 5);
    assert_eq!(summary.counts.quotations, 4);
    assert_eq!(summary.counts.orders, 2);

    assert_eq!(summary.month.start, at(2026, 6, 1, 0, 0, 0));
    assert_eq!(summary.month.end, at(2026, 7, 1, 0, 0, 0));
    assert_eq!(summary.month.new_companies, 1);
    assert_eq!(summary.month.new_quotations, 2);
    assert_eq!(summary.month.quotations_value, dec!(100));
    assert_eq!(summary.month.new_orders, 1);
    assert_eq!(summary.month.orders_value, dec!(92));

    assert_eq!(summary.year.new_companies, 3);
    assert_eq!(summary.year.new_quotations, 3);
    assert_eq!(summary.year.quotations_value, dec!(330));
    assert_eq!(summary.year.new_orders, 2);
    assert_eq!(summary.year.orders_value, dec!(132));
    assert_eq!(summary.year.exhibition_costs, Decimal::ZERO);

    assert_eq!(summary.unconverted_currencies, vec!["XYZ".to_string()]);
}

#[tokio::test]
async fn december_window_rolls_into_next_year() {
    let app = TestApp::new().await;
    insert_company(&app, "New year's eve", at(2026, 12, 31, 23, 0, 0)).await;
    insert_company(&app, "New year's day", at(2027, 1, 1, 0, 0, 0)).await;

    let summary = app
        .state
        .services
        .dashboard
        .summary_at(at(2026, 12, 20, 0, 0, 0))
        .await
        .unwrap();

    assert_eq!(summary.month.end, at(2027, 1, 1, 0, 0, 0));
    assert_eq!(summary.month.new_companies, 1);
    assert_eq!(summary.year.new_companies, 1);
}

#[tokio::test]
async fn empty_database_yields_zeroes() {
    let app = TestApp::new().await;
    let summary = app
        .state
        .services
        .dashboard
        .summary_at(at(2026, 2, 10, 0, 0, 0))
        .await
        .unwrap();

    assert_eq!(summary.counts, Default::default());
    assert_eq!(summary.month.quotations_value, Decimal::ZERO);
    assert!(summary.unconverted_currencies.is_empty());
    assert_eq!(
        summary.month.end.date_naive(),
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    );
}

#[tokio::test]
async fn dashboard_endpoint_reflects_new_records() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["counts"]["companies"], 0);

    // Mutations drop the cached summary.
    app.seed_company("Fresh").await;
    let response = app.request(Method::GET, "/api/v1/dashboard", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["counts"]["companies"], 1);
    assert_eq!(body["data"]["month"]["new_companies"], 1);
}
