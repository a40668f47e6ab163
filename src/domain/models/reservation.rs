use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Booking channel a reservation originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingSource {
    Airbnb,
    #[serde(rename = "VRBO")]
    Vrbo,
    Website,
    #[serde(rename = "Booking.com")]
    BookingCom,
    Expedia,
}

impl BookingSource {
    pub const ALL: [BookingSource; 5] = [
        BookingSource::Airbnb,
        BookingSource::Vrbo,
        BookingSource::Website,
        BookingSource::BookingCom,
        BookingSource::Expedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::Airbnb => "Airbnb",
            BookingSource::Vrbo => "VRBO",
            BookingSource::Website => "Website",
            BookingSource::BookingCom => "Booking.com",
            BookingSource::Expedia => "Expedia",
        }
    }

    /// Lenient parse used at ingestion: anything unrecognised is a website booking.
    pub fn from_channel(raw: &str) -> Self {
        raw.parse().unwrap_or(BookingSource::Website)
    }
}

impl fmt::Display for BookingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingSource {
    type Err = ();

    /// Matches channel display names as well as the integration names
    /// property-management systems report (`AirbnbIntegration`, `HomeAway`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized.contains("airbnb") {
            Ok(BookingSource::Airbnb)
        } else if normalized.contains("vrbo") || normalized.contains("homeaway") {
            Ok(BookingSource::Vrbo)
        } else if normalized.contains("booking") {
            Ok(BookingSource::BookingCom)
        } else if normalized.contains("expedia") {
            Ok(BookingSource::Expedia)
        } else if normalized == "website" || normalized == "direct" || normalized == "manual" {
            Ok(BookingSource::Website)
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: i64,
    pub house_name: String,
    pub source: BookingSource,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
}

pub struct NewReservationParams {
    pub id: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub house_name: String,
    pub source: BookingSource,
    pub guest_name: String,
}

impl Reservation {
    pub fn new(params: NewReservationParams) -> Self {
        Self {
            id: params.id,
            arrival: params.arrival,
            departure: params.departure,
            nights: (params.departure - params.arrival).num_days(),
            house_name: params.house_name,
            source: params.source,
            guest_name: params.guest_name,
            guest_email: None,
            guest_phone: None,
            total_amount: None,
            currency: None,
        }
    }

    /// A stay is placeable only when it ends strictly after it starts.
    pub fn is_well_formed(&self) -> bool {
        self.arrival < self.departure
    }

    /// Month-overlap rule: `arrival <= end AND departure >= start`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.arrival <= end && self.departure >= start
    }
}

/// Row shape of a reservation imported from an uploaded CSV export.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UploadedReservation {
    pub id: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub house_name: String,
    pub source: String,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub uploaded_by: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<UploadedReservation> for Reservation {
    fn from(row: UploadedReservation) -> Self {
        let mut reservation = Reservation::new(NewReservationParams {
            id: row.id,
            arrival: row.arrival,
            departure: row.departure,
            house_name: row.house_name,
            source: BookingSource::from_channel(&row.source),
            guest_name: row.guest_name,
        });
        reservation.guest_email = row.guest_email;
        reservation.guest_phone = row.guest_phone;
        reservation.total_amount = row.total_amount.and_then(|a| a.parse().ok());
        reservation.currency = row.currency;
        reservation
    }
}

/// Inclusive date range a caller wants reservations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn admits(&self, reservation: &Reservation) -> bool {
        reservation.overlaps(self.start, self.end)
    }
}
