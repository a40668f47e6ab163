use std::collections::HashSet;
use std::io::{Cursor, Write};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tera::{Context, Tera};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};
use crate::domain::models::calendar::{ApartmentCalendar, ReservationTouch};
use crate::domain::models::comment::Comment;
use crate::domain::models::property::PropertyConfig;
use crate::domain::services::color::{color_for_source, legend, LegendEntry};
use crate::error::AppError;

pub const PRINT_TEMPLATE: &str = "calendar_print.html";
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Serialize)]
struct PrintableTouch {
    reservation_id: String,
    guest_name: String,
    source: String,
    color: String,
    nights: i64,
}

impl From<&ReservationTouch<'_>> for PrintableTouch {
    fn from(touch: &ReservationTouch<'_>) -> Self {
        let r = touch.reservation;
        Self {
            reservation_id: r.id.clone(),
            guest_name: r.guest_name.clone(),
            source: r.source.to_string(),
            color: color_for_source(r.source, Some(&r.id)),
            nights: r.nights,
        }
    }
}

#[derive(Serialize)]
struct PrintableDay {
    day: u32,
    date: String,
    is_current_month: bool,
    checkouts: Vec<PrintableTouch>,
    checkins: Vec<PrintableTouch>,
    stays: Vec<PrintableTouch>,
    comments: Vec<String>,
}

#[derive(Serialize)]
struct BookingNote {
    reservation_id: String,
    guest_name: String,
    body: String,
}

#[derive(Serialize)]
struct PrintableCalendar {
    apartment: String,
    title: String,
    weekdays: [&'static str; 7],
    weeks: Vec<Vec<PrintableDay>>,
    total_bookings: usize,
    legend: Vec<LegendEntry>,
    booking_notes: Vec<BookingNote>,
}

fn guest_for<'a>(calendar: &'a ApartmentCalendar<'_>, reservation_id: &str) -> Option<&'a str> {
    calendar.days()
        .flat_map(|d| d.reservations.iter())
        .find(|t| t.reservation.id == reservation_id)
        .map(|t| t.reservation.guest_name.as_str())
}

fn day_comments(calendar: &ApartmentCalendar<'_>, comments: &[Comment], date: NaiveDate) -> Vec<String> {
    comments.iter()
        .filter(|c| c.day == Some(date))
        .map(|c| match c.reservation_id.as_deref().and_then(|id| guest_for(calendar, id)) {
            Some(guest) => format!("{}: {}", guest, c.body),
            None => c.body.clone(),
        })
        .collect()
}

fn build_view(calendar: &ApartmentCalendar<'_>, comments: &[Comment]) -> Result<PrintableCalendar, AppError> {
    let first = NaiveDate::from_ymd_opt(calendar.year, calendar.month, 1)
        .ok_or(AppError::Validation("Invalid calendar month".into()))?;

    let weeks = calendar.weeks.iter()
        .map(|week| week.days.iter().map(|day| PrintableDay {
            day: day.date.day(),
            date: day.date.to_string(),
            is_current_month: day.is_current_month,
            checkouts: day.reservations.iter().filter(|t| t.is_checkout).map(PrintableTouch::from).collect(),
            checkins: day.reservations.iter().filter(|t| t.is_checkin).map(PrintableTouch::from).collect(),
            stays: day.reservations.iter().filter(|t| t.is_stay()).map(PrintableTouch::from).collect(),
            comments: day_comments(calendar, comments, day.date),
        }).collect())
        .collect();

    let booking_notes = comments.iter()
        .filter(|c| c.day.is_none())
        .filter_map(|c| {
            let id = c.reservation_id.as_deref()?;
            let guest = guest_for(calendar, id)?;
            Some(BookingNote { reservation_id: id.to_string(), guest_name: guest.to_string(), body: c.body.clone() })
        })
        .collect();

    Ok(PrintableCalendar {
        apartment: calendar.apartment_name.clone(),
        title: first.format("%B %Y").to_string(),
        weekdays: WEEKDAYS,
        weeks,
        total_bookings: calendar.total_bookings,
        legend: legend(),
        booking_notes,
    })
}

/// Renders the month grid as a standalone printable HTML page.
pub fn render_calendar_html(tera: &Tera, calendar: &ApartmentCalendar<'_>, comments: &[Comment]) -> Result<String, AppError> {
    let view = build_view(calendar, comments)?;
    let context = Context::from_serialize(&view)
        .map_err(|e| AppError::InternalWithMsg(format!("Template context error: {}", e)))?;

    tera.render(PRINT_TEMPLATE, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render error: {:?}", e)))
}

/// File-system friendly form of an apartment name.
pub fn slugify(name: &str) -> String {
    let slug: String = name.trim().to_ascii_lowercase().chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.split('-').filter(|p| !p.is_empty()).collect::<Vec<_>>().join("-")
}

/// Slug of one apartment, or `property-{id}` when the name has no usable characters.
pub fn apartment_slug(property: &PropertyConfig) -> String {
    match slugify(&property.name) {
        slug if slug.is_empty() => format!("property-{}", property.id),
        slug => slug,
    }
}

/// Slugs for a set of apartments, in order. Names that collapse onto an
/// already used slug get the property id appended.
pub fn unique_slugs(properties: &[PropertyConfig]) -> Vec<String> {
    let mut used = HashSet::new();
    properties.iter()
        .map(|property| {
            let base = apartment_slug(property);
            let mut slug = base.clone();
            let mut attempt = 0;
            while used.contains(&slug) {
                attempt += 1;
                slug = match attempt {
                    1 => format!("{}-{}", base, property.id),
                    n => format!("{}-{}-{}", base, property.id, n),
                };
            }
            used.insert(slug.clone());
            slug
        })
        .collect()
}

pub fn export_file_stem(slug: &str, year: i32, month: u32) -> String {
    format!("calendar-{}-{}-{:02}", slug, year, month)
}

/// Bundles named files into an in-memory deflated ZIP archive.
pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in entries {
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::InternalWithMsg(format!("ZIP entry error: {}", e)))?;
        zip.write_all(data)
            .map_err(|e| AppError::InternalWithMsg(format!("ZIP write error: {}", e)))?;
    }

    let cursor = zip.finish()
        .map_err(|e| AppError::InternalWithMsg(format!("ZIP finalize error: {}", e)))?;
    Ok(cursor.into_inner())
}
