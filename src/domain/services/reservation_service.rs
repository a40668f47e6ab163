use std::collections::HashSet;
use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use crate::domain::models::reservation::{DateWindow, Reservation};
use crate::domain::ports::{ReservationSource, UploadedReservationRepository};
use crate::error::AppError;

#[derive(Debug, Serialize, Default)]
pub struct ReservationBatch {
    pub reservations: Vec<Reservation>,
    pub warnings: Vec<String>,
}

/// Merges every reservation feed into one normalized list.
pub struct ReservationService {
    lodgify: Arc<dyn ReservationSource>,
    ics_feed: Arc<dyn ReservationSource>,
    uploads: Arc<dyn UploadedReservationRepository>,
}

impl ReservationService {
    pub fn new(
        lodgify: Arc<dyn ReservationSource>,
        ics_feed: Arc<dyn ReservationSource>,
        uploads: Arc<dyn UploadedReservationRepository>,
    ) -> Self {
        Self { lodgify, ics_feed, uploads }
    }

    /// Reservations overlapping `window`, optionally narrowed to one apartment.
    ///
    /// Ids seen earlier win: Lodgify first, then uploaded exports, then ICS feeds.
    /// A failing remote source is reported in `warnings` and the others still count;
    /// a failing upload store is a hard error.
    pub async fn collect(&self, window: DateWindow, apartment: Option<&str>) -> Result<ReservationBatch, AppError> {
        let mut batch = ReservationBatch::default();
        let mut seen = HashSet::new();

        let lodgify = self.fetch_source(self.lodgify.as_ref(), window, &mut batch.warnings).await;
        let uploaded: Vec<Reservation> = self.uploads.list_by_range(window.start, window.end).await?
            .into_iter()
            .map(Reservation::from)
            .collect();
        let ics = self.fetch_source(self.ics_feed.as_ref(), window, &mut batch.warnings).await;

        for reservation in lodgify.into_iter().chain(uploaded).chain(ics) {
            if !window.admits(&reservation) {
                continue;
            }
            if let Some(name) = apartment
                && !reservation.house_name.eq_ignore_ascii_case(name) {
                continue;
            }
            if seen.insert(reservation.id.clone()) {
                batch.reservations.push(reservation);
            }
        }

        batch.reservations.sort_by(|a, b| a.arrival.cmp(&b.arrival).then_with(|| a.id.cmp(&b.id)));

        info!(
            count = batch.reservations.len(),
            warnings = batch.warnings.len(),
            "Collected reservations for {} .. {}", window.start, window.end
        );
        Ok(batch)
    }

    async fn fetch_source(&self, source: &dyn ReservationSource, window: DateWindow, warnings: &mut Vec<String>) -> Vec<Reservation> {
        match source.fetch(window).await {
            Ok(reservations) => reservations,
            Err(e) => {
                warn!("Reservation source {} failed: {}", source.name(), e);
                warnings.push(format!("{} unavailable: {}", source.name(), e));
                Vec::new()
            }
        }
    }
}
