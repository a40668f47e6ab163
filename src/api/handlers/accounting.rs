use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::MonthQuery;
use crate::api::extractors::owner::OwnerUser;
use crate::domain::models::reservation::DateWindow;
use crate::domain::services::accounting::build_report;
use crate::domain::services::calendar_grid::month_bounds;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

pub async fn get_accounting(
    State(state): State<Arc<AppState>>,
    _owner: OwnerUser,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = month_bounds(query.year, query.month)?;
    let batch = state.reservation_service
        .collect(DateWindow::new(start, end), query.apartment.as_deref())
        .await?;

    let report = build_report(&batch.reservations, &state.catalog, &state.commission_policy, query.year, query.month)?;
    Ok(Json(report))
}
