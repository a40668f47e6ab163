use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::api::dtos::requests::{ApartmentMonthQuery, UpsertCommentRequest};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::calendar::reservation_ids;
use crate::domain::models::comment::Comment;
use crate::domain::services::calendar_grid::visible_window;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

const MAX_COMMENT_LEN: usize = 2000;

/// Stores the note for (apartment, day, reservation). An empty body removes it.
pub async fn upsert_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpsertCommentRequest>,
) -> Result<Response, AppError> {
    let apartment = state.catalog.find_by_name(&payload.apartment)
        .map(|p| p.name.clone())
        .ok_or_else(|| AppError::NotFound(format!("Unknown apartment '{}'", payload.apartment.trim())))?;

    let reservation_id = payload.reservation_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    if payload.day.is_none() && reservation_id.is_none() {
        return Err(AppError::Validation("A comment needs a day, a reservation, or both".into()));
    }

    let body = payload.body.trim();
    if body.is_empty() {
        state.comment_repo.delete_by_key(&apartment, payload.day, reservation_id.as_deref()).await?;
        info!("Cleared comment for {} {:?} {:?}", apartment, payload.day, reservation_id);
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    if body.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::Validation(format!("Comment exceeds {} characters", MAX_COMMENT_LEN)));
    }

    let comment = Comment::new(apartment, payload.day, reservation_id, body.to_string(), user.username);
    let stored = state.comment_repo.upsert(&comment).await?;

    info!("Saved comment {} for {}", stored.id, stored.apartment);
    Ok(Json(stored).into_response())
}

/// Comments shown on the month's grid, including notes on reservations visible in it.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ApartmentMonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = visible_window(query.year, query.month)?;
    let apartment = state.catalog.find_by_name(&query.apartment)
        .map(|p| p.name.clone())
        .ok_or_else(|| AppError::NotFound(format!("Unknown apartment '{}'", query.apartment.trim())))?;

    let batch = state.reservation_service.collect(window, Some(&apartment)).await?;
    let comments = state.comment_repo
        .list_by_range(&apartment, window.start, window.end, &reservation_ids(&batch.reservations))
        .await?;
    Ok(Json(comments))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.comment_repo.delete(&comment_id).await?;
    info!("Deleted comment {}", comment_id);
    Ok(StatusCode::NO_CONTENT)
}
