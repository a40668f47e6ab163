use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{accounting, apartment, auth, calendar, comment, health, reservation, user};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Users (owner only)
        .route("/api/v1/users", post(user::create_user).get(user::list_users))
        .route("/api/v1/users/{user_id}", delete(user::delete_user))

        // Catalog
        .route("/api/v1/apartments", get(apartment::list_apartments))
        .route("/api/v1/colors/legend", get(apartment::color_legend))

        // Reservations
        .route("/api/v1/reservations", get(reservation::list_reservations))
        .route("/api/v1/reservations/upload", post(reservation::upload_reservations))
        .route("/api/v1/reservations/uploaded", get(reservation::list_uploaded))
        .route("/api/v1/reservations/uploaded/{reservation_id}", delete(reservation::delete_uploaded))
        .route("/api/v1/feeds/refresh", post(reservation::refresh_feeds))

        // Calendar
        .route("/api/v1/calendar", get(calendar::get_calendar))
        .route("/api/v1/calendar/print", get(calendar::print_calendar))
        .route("/api/v1/calendar/ics", get(calendar::ics_calendar))
        .route("/api/v1/calendar/export", get(calendar::export_calendars))

        // Comments
        .route("/api/v1/comments", put(comment::upsert_comment).get(comment::list_comments))
        .route("/api/v1/comments/{comment_id}", delete(comment::delete_comment))

        // Accounting (owner only)
        .route("/api/v1/accounting", get(accounting::get_accounting))

        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}