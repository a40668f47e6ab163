use chrono::{Datelike, Days, NaiveDate};
use std::cmp::{max, min};
use std::collections::{HashMap, HashSet};
use crate::domain::models::calendar::{ApartmentCalendar, CalendarDay, CalendarWeek, ReservationTouch};
use crate::domain::models::reservation::{DateWindow, Reservation};
use crate::error::AppError;

const DAYS_PER_WEEK: usize = 7;

/// First and last day of a 1-based month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!("Month must be between 1 and 12, got {}", month)));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(AppError::Validation(format!("Year {} is out of range", year)))?;

    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or(AppError::Validation(format!("Year {} is out of range", year)))?;

    Ok((first, last))
}

/// Sunday on/before the 1st through Saturday on/after the last day of the month.
pub fn visible_window(year: i32, month: u32) -> Result<DateWindow, AppError> {
    let (first, last) = month_bounds(year, month)?;

    let lead = first.weekday().num_days_from_sunday() as u64;
    let trail = 6 - last.weekday().num_days_from_sunday() as u64;

    let start = first.checked_sub_days(Days::new(lead))
        .ok_or(AppError::Validation(format!("Year {} is out of range", year)))?;
    let end = last.checked_add_days(Days::new(trail))
        .ok_or(AppError::Validation(format!("Year {} is out of range", year)))?;

    Ok(DateWindow::new(start, end))
}

/// Lays reservations onto the month grid of one apartment.
///
/// Every night of a well-formed stay (`arrival <= d < departure`) gets a touch,
/// flagged as check-in on the arrival date, and the departure date gets a
/// separate check-out touch. Stays with `departure <= arrival` place nothing but
/// are still counted in `total_bookings` when their raw interval overlaps the
/// month. Within a day, check-out touches come before the rest so a turnover day
/// reads departure-then-arrival.
pub fn build_calendar<'a>(
    apartment_name: &str,
    reservations: &'a [Reservation],
    year: i32,
    month: u32,
) -> Result<ApartmentCalendar<'a>, AppError> {
    let (month_start, month_end) = month_bounds(year, month)?;
    let visible = visible_window(year, month)?;

    let mut touches: HashMap<NaiveDate, Vec<ReservationTouch<'a>>> = HashMap::new();

    for reservation in reservations {
        if !reservation.is_well_formed() {
            continue;
        }

        if let Some(last_night) = reservation.departure.pred_opt() {
            let from = max(reservation.arrival, visible.start);
            let to = min(last_night, visible.end);

            for date in from.iter_days().take_while(|d| *d <= to) {
                touches.entry(date).or_default().push(ReservationTouch {
                    reservation,
                    is_checkin: date == reservation.arrival,
                    is_checkout: false,
                });
            }
        }

        if reservation.departure >= visible.start && reservation.departure <= visible.end {
            touches.entry(reservation.departure).or_default().push(ReservationTouch {
                reservation,
                is_checkin: false,
                is_checkout: true,
            });
        }
    }

    let mut weeks = Vec::new();
    let mut current = Vec::with_capacity(DAYS_PER_WEEK);

    for date in visible.start.iter_days().take_while(|d| *d <= visible.end) {
        let mut day_touches = touches.remove(&date).unwrap_or_default();
        day_touches.sort_by_key(|t| !t.is_checkout);

        current.push(CalendarDay {
            date,
            is_current_month: date >= month_start && date <= month_end,
            reservations: day_touches,
        });

        if current.len() == DAYS_PER_WEEK {
            weeks.push(CalendarWeek { days: std::mem::replace(&mut current, Vec::with_capacity(DAYS_PER_WEEK)) });
        }
    }

    let total_bookings = reservations.iter()
        .filter(|r| r.overlaps(month_start, month_end))
        .map(|r| r.id.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(ApartmentCalendar {
        apartment_name: apartment_name.to_string(),
        year,
        month,
        weeks,
        total_bookings,
    })
}
