use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::responses::ApartmentResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::color::legend;
use crate::state::AppState;
use std::sync::Arc;

pub async fn list_apartments(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> impl IntoResponse {
    let apartments: Vec<ApartmentResponse> = state.catalog.all().iter().map(ApartmentResponse::from).collect();
    Json(apartments)
}

pub async fn color_legend() -> impl IntoResponse {
    Json(legend())
}
