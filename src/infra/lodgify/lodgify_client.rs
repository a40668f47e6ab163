use crate::domain::models::property::PropertyCatalog;
use crate::domain::models::reservation::{BookingSource, DateWindow, NewReservationParams, Reservation};
use crate::domain::ports::ReservationSource;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;
const PAGE_SIZE: usize = 50;
const SKIPPED_STATUSES: [&str; 3] = ["declined", "cancelled", "canceled"];

#[derive(Debug, Deserialize)]
struct BookingsPage {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    items: Vec<LodgifyBooking>,
}

#[derive(Debug, Deserialize)]
struct LodgifyGuest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LodgifyBooking {
    id: i64,
    arrival: NaiveDate,
    departure: NaiveDate,
    property_id: i64,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    guest: Option<LodgifyGuest>,
    #[serde(default)]
    total_amount: Option<f64>,
    #[serde(default)]
    currency_code: Option<String>,
}

impl LodgifyBooking {
    fn is_live(&self) -> bool {
        match &self.status {
            Some(status) => !SKIPPED_STATUSES.contains(&status.to_ascii_lowercase().as_str()),
            None => true,
        }
    }

    fn into_reservation(self, catalog: &PropertyCatalog) -> Reservation {
        let guest = self.guest.unwrap_or(LodgifyGuest { name: None, email: None, phone: None });
        let mut reservation = Reservation::new(NewReservationParams {
            id: self.id.to_string(),
            arrival: self.arrival,
            departure: self.departure,
            house_name: catalog.name_for(self.property_id),
            source: BookingSource::from_channel(self.source.as_deref().unwrap_or_default()),
            guest_name: guest.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| "Guest".to_string()),
        });
        reservation.guest_email = guest.email;
        reservation.guest_phone = guest.phone;
        reservation.total_amount = self.total_amount
            .and_then(|amount| Decimal::try_from(amount).ok())
            .map(|d| d.round_dp(2));
        reservation.currency = self.currency_code;
        reservation
    }
}

/// Pulls bookings from the Lodgify v2 REST API.
pub struct LodgifyClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    catalog: Arc<PropertyCatalog>,
    initial_backoff: Duration,
}

impl LodgifyClient {
    pub fn new(base_url: String, api_key: Option<String>, catalog: Arc<PropertyCatalog>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            catalog,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    /// First retry delay; doubles on every further attempt.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    async fn fetch_page_with_retry(&self, api_key: &str, window: DateWindow, page: usize) -> Result<BookingsPage, AppError> {
        let url = format!("{}/reservations/bookings", self.base_url);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let res = self.client.get(&url)
                .header("X-ApiKey", api_key)
                .header("Accept", "application/json")
                .query(&[
                    ("start", window.start.to_string()),
                    ("end", window.end.to_string()),
                    ("page", page.to_string()),
                    ("size", PAGE_SIZE.to_string()),
                    ("includeCount", "true".to_string()),
                ])
                .send()
                .await;

            match res {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<BookingsPage>().await.map_err(|e| {
                            error!("Failed to parse Lodgify response JSON: {:?}", e);
                            AppError::Upstream(format!("Lodgify returned malformed JSON: {}", e))
                        });
                    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if retries >= MAX_RETRIES {
                            error!("Lodgify API failed after {} retries. Status: {}", retries, status);
                            return Err(AppError::Upstream(format!("Lodgify error: {}", status)));
                        }
                        warn!("Lodgify transient error {}. Retrying in {:?}...", status, backoff);
                    } else {
                        let text = response.text().await.unwrap_or_default();
                        error!("Lodgify terminal error {}: {}", status, text);
                        return Err(AppError::Upstream(format!("Lodgify rejected request: {}", status)));
                    }
                },
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        error!("Lodgify network error after {} retries: {:?}", retries, e);
                        return Err(AppError::Upstream(format!("Lodgify network error: {}", e)));
                    }
                    warn!("Lodgify network error. Retrying in {:?}... {:?}", backoff, e);
                }
            }

            sleep(backoff).await;
            retries += 1;
            backoff *= 2;
        }
    }
}

#[async_trait]
impl ReservationSource for LodgifyClient {
    fn name(&self) -> &'static str {
        "Lodgify"
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    async fn fetch(&self, window: DateWindow) -> Result<Vec<Reservation>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("Lodgify API key not configured, skipping");
            return Ok(Vec::new());
        };

        let mut reservations = Vec::new();
        let mut seen = 0;
        let mut page = 1;

        loop {
            let batch = self.fetch_page_with_retry(api_key, window, page).await?;
            let received = batch.items.len();
            seen += received;

            reservations.extend(
                batch.items.into_iter()
                    .filter(LodgifyBooking::is_live)
                    .map(|b| b.into_reservation(&self.catalog))
            );

            let exhausted = batch.count.is_some_and(|total| seen >= total);
            if received < PAGE_SIZE || exhausted {
                break;
            }
            page += 1;
        }

        info!("Fetched {} reservations from Lodgify ({} pages)", reservations.len(), page);
        Ok(reservations)
    }
}
