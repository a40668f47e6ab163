use chrono::NaiveDate;
use serde::Serialize;
use crate::domain::models::reservation::Reservation;

/// Presence of one reservation on one calendar day.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct ReservationTouch<'a> {
    pub reservation: &'a Reservation,
    pub is_checkin: bool,
    pub is_checkout: bool,
}

impl ReservationTouch<'_> {
    pub fn is_stay(&self) -> bool {
        !self.is_checkin && !self.is_checkout
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub reservations: Vec<ReservationTouch<'a>>,
}

/// Sunday through Saturday.
#[derive(Debug, Serialize, Clone)]
pub struct CalendarWeek<'a> {
    pub days: Vec<CalendarDay<'a>>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ApartmentCalendar<'a> {
    pub apartment_name: String,
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<CalendarWeek<'a>>,
    pub total_bookings: usize,
}

impl<'a> ApartmentCalendar<'a> {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay<'a>> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        self.days().find(|d| d.date == date)
    }

    pub fn first_visible(&self) -> Option<NaiveDate> {
        self.days().next().map(|d| d.date)
    }

    pub fn last_visible(&self) -> Option<NaiveDate> {
        self.days().last().map(|d| d.date)
    }
}
