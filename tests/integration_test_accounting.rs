mod common;

use axum::http::StatusCode;
use common::{date, parse_body, priced, reservation, TestApp, GARDEN_LOFT, SEA_VIEW};
use rental_calendar::domain::models::reservation::BookingSource;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_monthly_accounting_report() {
    let app = TestApp::new().await;
    app.lodgify.push(priced(reservation("S1", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)), "1000"));
    app.lodgify.push(priced(reservation("G1", GARDEN_LOFT, BookingSource::Expedia, date(2025, 9, 10), date(2025, 9, 12)), "500"));
    app.lodgify.push(priced(reservation("AUG", SEA_VIEW, BookingSource::Airbnb, date(2025, 8, 28), date(2025, 9, 2)), "700"));
    let auth = app.login_owner().await;

    let response = app.get("/api/v1/accounting?year=2025&month=9", Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = parse_body(response).await;

    let apartments = report["apartments"].as_array().unwrap();
    assert_eq!(apartments.len(), 2);
    assert_eq!(apartments[0]["apartment"], GARDEN_LOFT);
    assert_eq!(apartments[1]["apartment"], SEA_VIEW);

    let line = &apartments[1]["lines"][0];
    assert_eq!(line["reservation_id"], "S1");
    assert_eq!(amount(&line["channel_commission"]), Decimal::from_str("30.00").unwrap());
    assert_eq!(amount(&line["cleaning_fee"]), Decimal::from_str("60.00").unwrap());
    assert_eq!(amount(&line["management_commission"]), Decimal::from_str("182.00").unwrap());
    assert_eq!(amount(&line["net_owner"]), Decimal::from_str("728.00").unwrap());

    assert_eq!(report["totals"]["bookings"], 2);
    assert_eq!(amount(&report["totals"]["net_owner"]), Decimal::from_str("1020.00").unwrap());
}

#[tokio::test]
async fn test_accounting_filtered_by_apartment() {
    let app = TestApp::new().await;
    app.lodgify.push(priced(reservation("S1", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)), "1000"));
    app.lodgify.push(priced(reservation("G1", GARDEN_LOFT, BookingSource::Expedia, date(2025, 9, 10), date(2025, 9, 12)), "500"));
    let auth = app.login_owner().await;

    let report = parse_body(app.get("/api/v1/accounting?year=2025&month=9&apartment=Garden%20Loft", Some(&auth)).await).await;
    let apartments = report["apartments"].as_array().unwrap();
    assert_eq!(apartments.len(), 1);
    assert_eq!(apartments[0]["apartment"], GARDEN_LOFT);
}

#[tokio::test]
async fn test_accounting_is_owner_only() {
    let app = TestApp::new().await;
    let owner = app.login_owner().await;
    let staff = app.login_staff(&owner, "frontdesk").await;

    let response = app.get("/api/v1/accounting?year=2025&month=9", Some(&staff)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
