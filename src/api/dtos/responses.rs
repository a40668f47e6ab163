use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::models::calendar::{ApartmentCalendar, CalendarDay, ReservationTouch};
use crate::domain::models::property::PropertyConfig;
use crate::domain::models::user::User;
use crate::domain::services::color::{color_for_source, legend, LegendEntry};
use crate::domain::services::csv_import::RowError;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ApartmentResponse {
    pub id: i64,
    pub name: String,
    pub cleaning_fee: Decimal,
    pub has_ics_feed: bool,
}

impl From<&PropertyConfig> for ApartmentResponse {
    fn from(p: &PropertyConfig) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            cleaning_fee: p.cleaning_fee,
            has_ics_feed: p.vrbo_ics_url.is_some(),
        }
    }
}

#[derive(Serialize)]
pub struct TouchResponse {
    pub reservation_id: String,
    pub guest_name: String,
    pub source: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: i64,
    pub is_checkin: bool,
    pub is_checkout: bool,
    pub color: String,
}

impl From<&ReservationTouch<'_>> for TouchResponse {
    fn from(touch: &ReservationTouch<'_>) -> Self {
        let r = touch.reservation;
        Self {
            reservation_id: r.id.clone(),
            guest_name: r.guest_name.clone(),
            source: r.source.to_string(),
            arrival: r.arrival,
            departure: r.departure,
            nights: r.nights,
            is_checkin: touch.is_checkin,
            is_checkout: touch.is_checkout,
            color: color_for_source(r.source, Some(&r.id)),
        }
    }
}

#[derive(Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub reservations: Vec<TouchResponse>,
}

impl From<&CalendarDay<'_>> for DayResponse {
    fn from(day: &CalendarDay<'_>) -> Self {
        Self {
            date: day.date,
            is_current_month: day.is_current_month,
            reservations: day.reservations.iter().map(TouchResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub apartment: String,
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayResponse>>,
    pub total_bookings: usize,
    pub legend: Vec<LegendEntry>,
    pub warnings: Vec<String>,
}

impl CalendarResponse {
    pub fn new(calendar: &ApartmentCalendar<'_>, warnings: Vec<String>) -> Self {
        Self {
            apartment: calendar.apartment_name.clone(),
            year: calendar.year,
            month: calendar.month,
            weeks: calendar.weeks.iter()
                .map(|w| w.days.iter().map(DayResponse::from).collect())
                .collect(),
            total_bookings: calendar.total_bookings,
            legend: legend(),
            warnings,
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub imported: usize,
    pub errors: Vec<RowError>,
}
