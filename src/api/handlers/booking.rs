use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::Actor;
use crate::api::dtos::requests::{BookingListQuery, CancelRequest, CreateBookingRequest, RescheduleRequest, StatusChangeRequest};
use crate::api::handlers::{parse_date, parse_time};
use crate::domain::models::user::Role;
use crate::domain::services::booking_service::NewBookingRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = NewBookingRequest {
        date: parse_date(&payload.date, "date")?,
        time: parse_time(&payload.time, "time")?,
        staff_id: payload.staff_id,
        service_id: payload.service_id,
        notes: payload.notes,
    };

    let created = state.booking_service.create(&actor.0, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Staff see their own bookings; admins may filter by any staff member.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(params): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_role(&[Role::Admin, Role::Staff])?;

    let date = params.date.as_deref().map(|d| parse_date(d, "date")).transpose()?;
    let staff_id = match actor.0.role {
        Role::Staff => Some(actor.0.id.clone()),
        _ => params.staff_id,
    };

    let bookings = state.booking_repo.list_filtered(staff_id.as_deref(), date).await?;
    Ok(Json(bookings))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_repo.list_by_client(&actor.0.id).await?))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.get(&actor.0, &booking_id).await?))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.history(&actor.0, &booking_id).await?))
}

pub async fn change_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.booking_service.transition(&actor.0, &booking_id, payload.status, payload.notes).await?;
    Ok(Json(updated))
}

/// The body is optional; without one the cancellation carries no notes.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let notes = payload.and_then(|Json(p)| p.notes);
    let cancelled = state.booking_service.cancel(&actor.0, &booking_id, notes).await?;
    Ok(Json(cancelled))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&payload.date, "date")?;
    let time = parse_time(&payload.time, "time")?;
    let moved = state.booking_service.reschedule(&actor.0, &booking_id, date, time, payload.notes).await?;
    Ok(Json(moved))
}
