mod common;

use axum::http::StatusCode;
use common::{parse_body, TestApp, SEA_VIEW};
use httpmock::prelude::*;
use rental_calendar::domain::models::property::PropertyConfig;
use rust_decimal::Decimal;

const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//HomeAway.com, Inc.//EN\r\n\
BEGIN:VEVENT\r\n\
UID:vrbo-900\r\n\
DTSTAMP:20250801T120000Z\r\n\
DTSTART;VALUE=DATE:20250910\r\n\
DTEND;VALUE=DATE:20250913\r\n\
SUMMARY:Reserved - Omar Haddad\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

const CALENDAR_URI: &str = "/api/v1/calendar?apartment=Sea%20View&year=2025&month=9";

#[tokio::test]
async fn test_refresh_refetches_cached_feeds() {
    let server = MockServer::start_async().await;
    let feed = server.mock_async(|when, then| {
        when.method(GET).path("/sea-view.ics");
        then.status(200).header("content-type", "text/calendar").body(FEED);
    }).await;

    let app = TestApp::with_live_feeds(vec![PropertyConfig {
        id: 101,
        name: SEA_VIEW.to_string(),
        cleaning_fee: Decimal::new(6000, 2),
        vrbo_ics_url: Some(server.url("/sea-view.ics")),
    }]).await;
    let auth = app.login_owner().await;

    let calendar = parse_body(app.get(CALENDAR_URI, Some(&auth)).await).await;
    assert_eq!(calendar["total_bookings"], 1);
    app.get(CALENDAR_URI, Some(&auth)).await;
    feed.assert_hits_async(1).await;

    let refresh = app.send("POST", "/api/v1/feeds/refresh", Some(&auth), None).await;
    assert_eq!(refresh.status(), StatusCode::NO_CONTENT);

    let calendar = parse_body(app.get(CALENDAR_URI, Some(&auth)).await).await;
    assert_eq!(calendar["total_bookings"], 1);
    feed.assert_hits_async(2).await;
}

#[tokio::test]
async fn test_refresh_requires_csrf_token() {
    let app = TestApp::new().await;
    let mut auth = app.login_owner().await;
    auth.csrf_token = "wrong".to_string();

    let refresh = app.send("POST", "/api/v1/feeds/refresh", Some(&auth), None).await;
    assert_eq!(refresh.status(), StatusCode::FORBIDDEN);
}
