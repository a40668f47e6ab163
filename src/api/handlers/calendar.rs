use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use crate::api::dtos::requests::{ApartmentMonthQuery, MonthQuery};
use crate::api::dtos::responses::CalendarResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::comment::Comment;
use crate::domain::models::reservation::Reservation;
use crate::domain::services::calendar_grid::{build_calendar, visible_window};
use crate::domain::services::ics::generate_ics;
use crate::domain::models::property::PropertyConfig;
use crate::domain::services::print::{apartment_slug, build_zip, export_file_stem, render_calendar_html, unique_slugs};
use crate::domain::services::reservation_service::ReservationBatch;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Everything needed to draw one apartment's month.
struct MonthData {
    property: PropertyConfig,
    apartment: String,
    batch: ReservationBatch,
    comments: Vec<Comment>,
}

fn resolve_apartment(state: &AppState, name: &str) -> Result<PropertyConfig, AppError> {
    state.catalog.find_by_name(name)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Unknown apartment '{}'", name.trim())))
}

pub(crate) fn reservation_ids(reservations: &[Reservation]) -> Vec<String> {
    reservations.iter().map(|r| r.id.clone()).collect()
}

async fn load_month(state: &AppState, query: &ApartmentMonthQuery) -> Result<MonthData, AppError> {
    let window = visible_window(query.year, query.month)?;
    let property = resolve_apartment(state, &query.apartment)?;
    let apartment = property.name.clone();

    let batch = state.reservation_service.collect(window, Some(&apartment)).await?;
    let comments = state.comment_repo
        .list_by_range(&apartment, window.start, window.end, &reservation_ids(&batch.reservations))
        .await?;

    Ok(MonthData { property, apartment, batch, comments })
}

pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ApartmentMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data = load_month(&state, &query).await?;
    let calendar = build_calendar(&data.apartment, &data.batch.reservations, query.year, query.month)?;

    Ok(Json(CalendarResponse::new(&calendar, data.batch.warnings.clone())))
}

pub async fn print_calendar(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ApartmentMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data = load_month(&state, &query).await?;
    let calendar = build_calendar(&data.apartment, &data.batch.reservations, query.year, query.month)?;

    let html = render_calendar_html(&state.templates, &calendar, &data.comments)?;
    Ok(Html(html))
}

pub async fn ics_calendar(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ApartmentMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data = load_month(&state, &query).await?;
    let body = generate_ics(&data.apartment, &data.batch.reservations);
    let filename = format!("{}.ics", export_file_stem(&apartment_slug(&data.property), query.year, query.month));

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    ))
}

/// One printable page and one .ics file per catalog apartment, zipped.
pub async fn export_calendars(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = visible_window(query.year, query.month)?;
    let batch = state.reservation_service.collect(window, None).await?;

    let properties: Vec<PropertyConfig> = match query.apartment.as_deref() {
        Some(name) => vec![resolve_apartment(&state, name)?],
        None => state.catalog.all().to_vec(),
    };
    let slugs = unique_slugs(&properties);

    let mut entries = Vec::with_capacity(properties.len() * 2);
    for (property, slug) in properties.iter().zip(&slugs) {
        let apartment = property.name.as_str();
        let reservations: Vec<Reservation> = batch.reservations.iter()
            .filter(|r| r.house_name.eq_ignore_ascii_case(apartment))
            .cloned()
            .collect();
        let comments = state.comment_repo
            .list_by_range(apartment, window.start, window.end, &reservation_ids(&reservations))
            .await?;
        let calendar = build_calendar(apartment, &reservations, query.year, query.month)?;

        let stem = export_file_stem(slug, query.year, query.month);
        let html = render_calendar_html(&state.templates, &calendar, &comments)?;
        entries.push((format!("{}.html", stem), html.into_bytes()));
        entries.push((format!("{}.ics", stem), generate_ics(apartment, &reservations).into_bytes()));
    }

    let archive = build_zip(&entries)?;
    info!("Exported {} apartments for {}-{:02} ({} bytes)", properties.len(), query.year, query.month, archive.len());

    let filename = format!("calendars-{}-{:02}.zip", query.year, query.month);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        archive,
    ))
}
