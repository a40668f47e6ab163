mod common;

use std::io::{Cursor, Read};
use axum::http::{header, StatusCode};
use common::{body_bytes, date, reservation, TestApp, GARDEN_LOFT, SEA_VIEW};
use rental_calendar::domain::models::property::PropertyConfig;
use rental_calendar::domain::models::reservation::BookingSource;
use rust_decimal::Decimal;
use zip::ZipArchive;

fn entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive.by_name(name).unwrap_or_else(|_| panic!("{} missing from archive", name));
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn test_export_bundles_every_apartment() {
    let app = TestApp::new().await;
    app.lodgify.push(reservation("S1", SEA_VIEW, BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 5)));
    app.lodgify.push(reservation("G1", GARDEN_LOFT, BookingSource::Vrbo, date(2025, 9, 10), date(2025, 9, 14)));
    let auth = app.login_owner().await;

    let response = app.get("/api/v1/calendar/export?year=2025&month=9", Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/zip");
    let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_string();
    assert!(disposition.contains("calendars-2025-09.zip"));

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"PK"));

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 4);

    let sea_view = entry(&mut archive, "calendar-sea-view-2025-09.html");
    assert!(sea_view.contains("Guest S1"));
    assert!(!sea_view.contains("Guest G1"));

    let loft_ics = entry(&mut archive, "calendar-garden-loft-2025-09.ics");
    assert!(loft_ics.contains("UID:G1"));
    assert!(!loft_ics.contains("UID:S1"));

    entry(&mut archive, "calendar-garden-loft-2025-09.html");
    entry(&mut archive, "calendar-sea-view-2025-09.ics");
}

#[tokio::test]
async fn test_export_single_apartment() {
    let app = TestApp::new().await;
    let auth = app.login_owner().await;

    let response = app.get("/api/v1/calendar/export?year=2025&month=9&apartment=garden%20loft", Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut archive = ZipArchive::new(Cursor::new(body_bytes(response).await)).unwrap();
    assert_eq!(archive.len(), 2);
    entry(&mut archive, "calendar-garden-loft-2025-09.html");

    let unknown = app.get("/api/v1/calendar/export?year=2025&month=9&apartment=Penthouse", Some(&auth)).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_requires_login() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/calendar/export?year=2025&month=9", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn property(id: i64, name: &str) -> PropertyConfig {
    PropertyConfig { id, name: name.to_string(), cleaning_fee: Decimal::ZERO, vrbo_ics_url: None }
}

#[tokio::test]
async fn test_export_keeps_colliding_names_apart() {
    let app = TestApp::with_properties(vec![
        property(101, "Sea View"),
        property(102, "Sea-View"),
        property(103, "Ático Ñ"),
        property(104, "Château"),
    ]).await;
    app.lodgify.push(reservation("DASH", "Sea-View", BookingSource::Airbnb, date(2025, 9, 1), date(2025, 9, 4)));
    let auth = app.login_owner().await;

    let response = app.get("/api/v1/calendar/export?year=2025&month=9", Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut archive = ZipArchive::new(Cursor::new(body_bytes(response).await)).unwrap();
    assert_eq!(archive.len(), 8);

    entry(&mut archive, "calendar-sea-view-2025-09.html");
    let dashed = entry(&mut archive, "calendar-sea-view-102-2025-09.html");
    assert!(dashed.contains("Guest DASH"));
    entry(&mut archive, "calendar-tico-2025-09.ics");
    entry(&mut archive, "calendar-ch-teau-2025-09.ics");
}

#[tokio::test]
async fn test_export_names_unsluggable_apartment_by_id() {
    let app = TestApp::with_properties(vec![property(7, "海景房")]).await;
    let auth = app.login_owner().await;

    let response = app.get("/api/v1/calendar/export?year=2025&month=9", Some(&auth)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut archive = ZipArchive::new(Cursor::new(body_bytes(response).await)).unwrap();
    entry(&mut archive, "calendar-property-7-2025-09.html");
    entry(&mut archive, "calendar-property-7-2025-09.ics");
}
