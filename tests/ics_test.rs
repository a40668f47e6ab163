use chrono::NaiveDate;
use rental_calendar::domain::models::reservation::{BookingSource, NewReservationParams, Reservation};
use rental_calendar::domain::services::ics::{generate_ics, parse_vrbo_feed};
use rental_calendar::error::AppError;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn feed(events: &[&str]) -> String {
    let mut lines = vec!["BEGIN:VCALENDAR", "VERSION:2.0", "PRODID:-//HomeAway.com, Inc.//EN"];
    for event in events {
        lines.extend(event.lines());
    }
    lines.push("END:VCALENDAR");
    lines.join("\r\n") + "\r\n"
}

const RESERVED: &str = "BEGIN:VEVENT\n\
UID:vrbo-111\n\
DTSTAMP:20250801T120000Z\n\
DTSTART;VALUE=DATE:20250901\n\
DTEND;VALUE=DATE:20250905\n\
SUMMARY:Reserved - Maria Lopez\n\
END:VEVENT";

const BLOCKED: &str = "BEGIN:VEVENT\n\
UID:vrbo-222\n\
DTSTAMP:20250801T120000Z\n\
DTSTART;VALUE=DATE:20250910\n\
DTEND;VALUE=DATE:20250912\n\
SUMMARY:Blocked\n\
END:VEVENT";

const TIMED: &str = "BEGIN:VEVENT\n\
UID:vrbo-333\n\
DTSTAMP:20250801T120000Z\n\
DTSTART:20250914T230000Z\n\
DTEND:20250917T090000Z\n\
SUMMARY:Reserved\n\
END:VEVENT";

#[test]
fn test_parses_reserved_events() {
    let body = feed(&[RESERVED, BLOCKED]);
    let reservations = parse_vrbo_feed(&body, "Sea View", chrono_tz::UTC).unwrap();

    assert_eq!(reservations.len(), 1);
    let r = &reservations[0];
    assert_eq!(r.id, "vrbo-111");
    assert_eq!(r.arrival, d(2025, 9, 1));
    assert_eq!(r.departure, d(2025, 9, 5));
    assert_eq!(r.nights, 4);
    assert_eq!(r.house_name, "Sea View");
    assert_eq!(r.guest_name, "Maria Lopez");
    assert_eq!(r.source, BookingSource::Vrbo);
}

#[test]
fn test_timed_events_use_calendar_timezone() {
    let body = feed(&[TIMED]);

    let utc = parse_vrbo_feed(&body, "Sea View", chrono_tz::UTC).unwrap();
    assert_eq!(utc[0].arrival, d(2025, 9, 14));
    assert_eq!(utc[0].guest_name, "VRBO Guest");

    let berlin = parse_vrbo_feed(&body, "Sea View", chrono_tz::Europe::Berlin).unwrap();
    assert_eq!(berlin[0].arrival, d(2025, 9, 15));
    assert_eq!(berlin[0].departure, d(2025, 9, 17));
}

#[test]
fn test_garbage_feed_is_upstream_error() {
    let result = parse_vrbo_feed("<html>502 Bad Gateway</html>", "Sea View", chrono_tz::UTC);
    assert!(matches!(result, Err(AppError::Upstream(_))) || matches!(result, Ok(ref r) if r.is_empty()));
}

#[test]
fn test_generated_export_contains_all_day_events() {
    let good = Reservation::new(NewReservationParams {
        id: "R1".to_string(),
        arrival: d(2025, 9, 1),
        departure: d(2025, 9, 5),
        house_name: "Sea View".to_string(),
        source: BookingSource::Airbnb,
        guest_name: "Jane Doe".to_string(),
    });
    let broken = Reservation::new(NewReservationParams {
        id: "BROKEN".to_string(),
        arrival: d(2025, 9, 8),
        departure: d(2025, 9, 8),
        house_name: "Sea View".to_string(),
        source: BookingSource::Airbnb,
        guest_name: "Nobody".to_string(),
    });

    let ics = generate_ics("Sea View", &[good, broken]);

    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains("UID:R1"));
    assert!(ics.contains("DTSTART;VALUE=DATE:20250901"));
    assert!(ics.contains("DTEND;VALUE=DATE:20250905"));
    assert!(ics.contains("Jane Doe (Airbnb)"));
    assert!(!ics.contains("BROKEN"));

    let reparsed = parse_vrbo_feed(&ics, "Sea View", chrono_tz::UTC).unwrap();
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed[0].arrival, d(2025, 9, 1));
    assert_eq!(reparsed[0].departure, d(2025, 9, 5));
}
