use crate::domain::models::property::PropertyCatalog;
use crate::domain::models::reservation::{DateWindow, Reservation};
use crate::domain::ports::{FeedCache, ReservationSource};
use crate::domain::services::ics::parse_vrbo_feed;
use crate::error::AppError;
use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Reads the per-apartment VRBO iCalendar exports listed in the catalog.
pub struct IcsFeedSource {
    client: Client,
    catalog: Arc<PropertyCatalog>,
    cache: Arc<dyn FeedCache>,
    calendar_tz: Tz,
}

impl IcsFeedSource {
    pub fn new(catalog: Arc<PropertyCatalog>, cache: Arc<dyn FeedCache>, calendar_tz: Tz) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_else(|_| Client::new()),
            catalog,
            cache,
            calendar_tz,
        }
    }

    async fn load_feed(&self, url: &str) -> Result<String, AppError> {
        if let Some(body) = self.cache.get(url).await {
            debug!("ICS cache hit for {}", url);
            return Ok(body);
        }

        let response = self.client.get(url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("ICS feed unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("ICS feed returned {}", status)));
        }

        let body = response.text()
            .await
            .map_err(|e| AppError::Upstream(format!("ICS feed body unreadable: {}", e)))?;

        self.cache.set(url, body.clone()).await;
        Ok(body)
    }
}

#[async_trait]
impl ReservationSource for IcsFeedSource {
    fn name(&self) -> &'static str {
        "VRBO ICS"
    }

    /// A broken feed only drops its own apartment; the source fails when every feed does.
    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    async fn fetch(&self, window: DateWindow) -> Result<Vec<Reservation>, AppError> {
        let feeds: Vec<_> = self.catalog.all().iter()
            .filter_map(|p| p.vrbo_ics_url.as_deref().map(|url| (p.name.as_str(), url)))
            .collect();

        let mut reservations = Vec::new();
        let mut last_error = None;
        let mut loaded = 0;

        for (apartment, url) in &feeds {
            let parsed = match self.load_feed(url).await {
                Ok(body) => parse_vrbo_feed(&body, apartment, self.calendar_tz),
                Err(e) => Err(e),
            };

            match parsed {
                Ok(items) => {
                    loaded += 1;
                    reservations.extend(items.into_iter().filter(|r| window.admits(r)));
                }
                Err(e) => {
                    warn!("ICS feed for {} failed: {}", apartment, e);
                    last_error = Some(e);
                }
            }
        }

        if loaded == 0
            && let Some(e) = last_error {
            return Err(e);
        }

        info!("Loaded {} reservations from {} ICS feeds", reservations.len(), loaded);
        Ok(reservations)
    }
}
