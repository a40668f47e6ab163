use chrono::{Days, NaiveDate, TimeZone};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event as IcalEvent, EventLike};
use crate::domain::models::reservation::{BookingSource, NewReservationParams, Reservation};
use crate::error::AppError;

const BLOCKED_MARKERS: [&str; 3] = ["blocked", "not available", "unavailable"];
const RESERVED_PREFIX: &str = "Reserved - ";

/// Generates an iCalendar (.ics) string with one all-day event per reservation.
pub fn generate_ics(apartment: &str, reservations: &[Reservation]) -> String {
    let mut calendar = Calendar::new();

    for reservation in reservations.iter().filter(|r| r.is_well_formed()) {
        let ical_event = IcalEvent::new()
            .summary(&format!("{} ({})", reservation.guest_name, reservation.source))
            .description(&format!("{} · {} nights · {}", apartment, reservation.nights, reservation.id))
            .location(apartment)
            .starts(reservation.arrival)
            .ends(reservation.departure)
            .uid(&reservation.id)
            .done();

        calendar.push(ical_event);
    }

    calendar.to_string()
}

/// Parses a VRBO availability feed into reservations for one apartment.
///
/// Owner blocks are skipped. Timed start/end values are converted into
/// `calendar_tz` before the date is taken, so a late-evening UTC timestamp
/// lands on the local calendar day.
pub fn parse_vrbo_feed(body: &str, house_name: &str, calendar_tz: Tz) -> Result<Vec<Reservation>, AppError> {
    let calendar: Calendar = body.parse()
        .map_err(|e: String| AppError::Upstream(format!("Invalid ICS feed for {}: {}", house_name, e)))?;

    let mut reservations = Vec::new();

    for component in &calendar.components {
        let CalendarComponent::Event(event) = component else {
            continue;
        };

        let summary = event.get_summary().unwrap_or_default().trim().to_string();
        let lowered = summary.to_ascii_lowercase();
        if BLOCKED_MARKERS.iter().any(|m| lowered.contains(m)) {
            continue;
        }

        let (Some(uid), Some(arrival)) = (
            event.get_uid(),
            event.get_start().and_then(|s| to_calendar_date(s, calendar_tz)),
        ) else {
            continue;
        };

        let departure = event.get_end()
            .and_then(|e| to_calendar_date(e, calendar_tz))
            .or_else(|| arrival.checked_add_days(Days::new(1)))
            .unwrap_or(arrival);

        let guest_name = summary.strip_prefix(RESERVED_PREFIX)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("VRBO Guest")
            .to_string();

        reservations.push(Reservation::new(NewReservationParams {
            id: uid.to_string(),
            arrival,
            departure,
            house_name: house_name.to_string(),
            source: BookingSource::Vrbo,
            guest_name,
        }));
    }

    Ok(reservations)
}

fn to_calendar_date(value: DatePerhapsTime, calendar_tz: Tz) -> Option<NaiveDate> {
    match value {
        DatePerhapsTime::Date(date) => Some(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => Some(naive.date()),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)) => Some(utc.with_timezone(&calendar_tz).date_naive()),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let local = tzid.parse::<Tz>().ok()
                .and_then(|source_tz| source_tz.from_local_datetime(&date_time).earliest())
                .map(|dt| dt.with_timezone(&calendar_tz).date_naive());
            Some(local.unwrap_or_else(|| date_time.date()))
        }
    }
}
