use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, catalogue, staff, users, schedule, availability, booking};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Catalogue
        .route("/api/v1/categories", get(catalogue::list_categories).post(catalogue::create_category))
        .route("/api/v1/services", get(catalogue::list_services).post(catalogue::create_service))
        .route("/api/v1/services/{service_id}", get(catalogue::get_service).put(catalogue::update_service))

        // Users & Staff
        .route("/api/v1/users", post(users::create_user))
        .route("/api/v1/staff", get(staff::list_staff))

        // Staff Schedules
        .route("/api/v1/staff/{staff_id}/working-hours", get(schedule::list_working_hours).put(schedule::upsert_working_hours))
        .route("/api/v1/staff/{staff_id}/working-hours/{day}", delete(schedule::delete_working_hours))
        .route("/api/v1/staff/{staff_id}/special-hours", get(schedule::list_special_hours).put(schedule::upsert_special_hours))
        .route("/api/v1/staff/{staff_id}/special-hours/{date}", delete(schedule::delete_special_hours))

        // Availability
        .route("/api/v1/staff/{staff_id}/availability", get(availability::check_availability))
        .route("/api/v1/staff/{staff_id}/slots", get(availability::list_slots))

        // Bookings
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/api/v1/bookings/my", get(booking::list_my_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/history", get(booking::get_history))
        .route("/api/v1/bookings/{booking_id}/status", post(booking::change_status))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/reschedule", post(booking::reschedule_booking))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
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
        .with_state(state)
}
