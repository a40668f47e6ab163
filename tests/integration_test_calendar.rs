mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, date, parse_body, reservation, TestApp, GARDEN_LOFT, SEA_VIEW};
use rental_calendar::domain::models::reservation::BookingSource;
use rental_calendar::domain::services::color::color_for;
use serde_json::Value;

const SEPTEMBER: &str = "year=2025&month=9";

fn touches<'a>(calendar: &'a Value, day: &str) -> &'a Vec<Value> {
    calendar["weeks"].as_array().unwrap().iter()
        .flat_map(|w| w.as_array().unwrap().iter())
        .find(|d| d["date"] == day)
        .and_then(|d| d["reservations"].as_array())
        .unwrap_or_else(|| panic!("day {} not in grid", day))
}

#[tokio::test]
async fn test_calendar_json_grid() {
    let app = TestApp::new().await;
    app.lodgify.push(reservation("R1", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)));
    app.lodgify.push(reservation("OTHER", GARDEN_LOFT, BookingSource::Vrbo, date(2025, 9, 1), date(2025, 9, 5)));
    let auth = app.login_owner().await;

    let response = app.get(&format!("/api/v1/calendar?apartment=sea%20view&{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let calendar = parse_body(response).await;

    assert_eq!(calendar["apartment"], SEA_VIEW);
    assert_eq!(calendar["total_bookings"], 1);
    assert_eq!(calendar["weeks"].as_array().unwrap().len(), 5);
    assert!(calendar["warnings"].as_array().unwrap().is_empty());
    assert_eq!(calendar["legend"].as_array().unwrap().len(), 6);

    let sep1 = touches(&calendar, "2025-09-01");
    assert_eq!(sep1.len(), 1);
    assert_eq!(sep1[0]["reservation_id"], "R1");
    assert_eq!(sep1[0]["is_checkin"], true);
    assert_eq!(sep1[0]["source"], "Airbnb");
    assert_eq!(sep1[0]["color"], color_for("Airbnb", Some("R1")));

    let sep5 = touches(&calendar, "2025-09-05");
    assert_eq!(sep5[0]["is_checkout"], true);

    let first_day = &calendar["weeks"][0][0];
    assert_eq!(first_day["date"], "2025-08-31");
    assert_eq!(first_day["is_current_month"], false);
}

#[tokio::test]
async fn test_sources_are_merged_with_lodgify_priority() {
    let app = TestApp::new().await;
    let auth = app.login_owner().await;

    let mut from_lodgify = reservation("SHARED", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 10), date(2025, 9, 12));
    from_lodgify.guest_name = "Lodgify Guest".to_string();
    app.lodgify.push(from_lodgify);

    let mut from_ics = reservation("SHARED", SEA_VIEW, BookingSource::Vrbo, date(2025, 9, 10), date(2025, 9, 12));
    from_ics.guest_name = "Feed Guest".to_string();
    app.ics_feed.push(from_ics);
    app.ics_feed.push(reservation("ICS-ONLY", SEA_VIEW, BookingSource::Vrbo, date(2025, 9, 20), date(2025, 9, 22)));

    let response = app.get(&format!("/api/v1/reservations?{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let batch = parse_body(response).await;

    let reservations = batch["reservations"].as_array().unwrap();
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0]["id"], "SHARED");
    assert_eq!(reservations[0]["guest_name"], "Lodgify Guest");
    assert_eq!(reservations[1]["id"], "ICS-ONLY");
}

#[tokio::test]
async fn test_failing_source_becomes_warning() {
    let app = TestApp::new().await;
    app.lodgify.set_failing(true);
    app.ics_feed.push(reservation("V1", SEA_VIEW, BookingSource::Vrbo, date(2025, 9, 3), date(2025, 9, 6)));
    let auth = app.login_owner().await;

    let response = app.get(&format!("/api/v1/calendar?apartment=Sea%20View&{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let calendar = parse_body(response).await;

    assert_eq!(calendar["total_bookings"], 1);
    let warnings = calendar["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("Lodgify"));
}

#[tokio::test]
async fn test_calendar_rejects_bad_input() {
    let app = TestApp::new().await;
    let auth = app.login_owner().await;

    let bad_month = app.get("/api/v1/calendar?apartment=Sea%20View&year=2025&month=13", Some(&auth)).await;
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);

    let unknown = app.get(&format!("/api/v1/calendar?apartment=Penthouse&{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_print_view_renders_html() {
    let app = TestApp::new().await;
    app.lodgify.push(reservation("A", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)));
    app.lodgify.push(reservation("B", SEA_VIEW, BookingSource::BookingCom, date(2025, 9, 5), date(2025, 9, 8)));
    let auth = app.login_owner().await;

    let response = app.get(&format!("/api/v1/calendar/print?apartment=Sea%20View&{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Sea View"));
    assert!(html.contains("September 2025"));
    assert!(html.contains("Guest A"));
    assert!(html.contains("Guest B"));
    assert!(html.contains("data-date=\"2025-09-05\""));
    assert!(html.contains(&color_for("Airbnb", Some("A"))));
}

#[tokio::test]
async fn test_ics_export() {
    let app = TestApp::new().await;
    app.lodgify.push(reservation("R1", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)));
    let auth = app.login_owner().await;

    let response = app.get(&format!("/api/v1/calendar/ics?apartment=Sea%20View&{}", SEPTEMBER), Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_string();
    assert!(disposition.contains("calendar-sea-view-2025-09.ics"));

    let ics = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(ics.contains("UID:R1"));
    assert!(ics.contains("DTSTART;VALUE=DATE:20250901"));
}

#[tokio::test]
async fn test_apartments_and_legend() {
    let app = TestApp::new().await;
    let auth = app.login_owner().await;

    let apartments = parse_body(app.get("/api/v1/apartments", Some(&auth)).await).await;
    let names: Vec<&str> = apartments.as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec![SEA_VIEW, GARDEN_LOFT]);

    let legend = parse_body(app.get("/api/v1/colors/legend", None).await).await;
    assert_eq!(legend[0]["source"], "Airbnb");
    assert_eq!(legend[5]["source"], "Other");
}
