use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::api::dtos::requests::{MonthQuery, UploadQuery};
use crate::api::dtos::responses::UploadResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::reservation::BookingSource;
use crate::domain::services::calendar_grid::visible_window;
use crate::domain::services::csv_import::parse_reservations_csv;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{info, warn};

/// Merged reservations from every source for the visible weeks of a month.
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = visible_window(query.year, query.month)?;
    let batch = state.reservation_service.collect(window, query.apartment.as_deref()).await?;
    Ok(Json(batch))
}

pub async fn upload_reservations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("Upload body is empty".into()));
    }

    let default_source = match query.source.as_deref() {
        Some(raw) => raw.parse::<BookingSource>()
            .map_err(|_| AppError::Validation(format!("Unknown booking source '{}'", raw)))?,
        None => BookingSource::Website,
    };

    let import = parse_reservations_csv(&body, default_source, &user.username)?;
    for row in &import.errors {
        warn!("CSV row {} rejected: {}", row.row, row.reason);
    }

    for reservation in &import.reservations {
        state.upload_repo.upsert(reservation).await?;
    }

    info!("Imported {} uploaded reservations ({} rejected)", import.reservations.len(), import.errors.len());
    Ok(Json(UploadResponse {
        imported: import.reservations.len(),
        errors: import.errors,
    }))
}

pub async fn list_uploaded(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let uploaded = state.upload_repo.list().await?;
    Ok(Json(uploaded))
}

pub async fn delete_uploaded(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(reservation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.upload_repo.delete(&reservation_id).await?;
    info!("Deleted uploaded reservation {}", reservation_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Drops cached ICS bodies so the next read refetches every feed.
pub async fn refresh_feeds(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> impl IntoResponse {
    state.feed_cache.invalidate_all().await;
    info!("ICS feed cache invalidated");
    StatusCode::NO_CONTENT
}
