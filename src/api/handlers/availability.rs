use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{AvailabilityQuery, SlotsQuery},
    responses::{AvailabilityResponse, SlotResponse, SlotsResponse},
};
use crate::api::handlers::{load_active_staff, parse_date, parse_time};
use crate::error::AppError;
use std::sync::Arc;

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<String>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&params.date, "date")?;
    let time = parse_time(&params.time, "time")?;
    let staff = load_active_staff(&state, &staff_id).await?;
    let service = state.catalogue_repo.find_service(&params.service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    let decision = state.checker.check(&staff.id, date, time, service.duration_minutes).await?;

    Ok(Json(AvailabilityResponse {
        staff_id: staff.id,
        date: date.to_string(),
        time: time.format("%H:%M").to_string(),
        service_id: service.id,
        duration_minutes: service.duration_minutes,
        available: decision.is_available(),
        reason: decision.reason(),
        message: decision.message(),
        conflicting_booking_id: AvailabilityResponse::conflicting_id(&decision),
    }))
}

/// Hourly start times for a day, each with its availability decision.
pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<String>,
    Query(params): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&params.date, "date")?;
    let staff = load_active_staff(&state, &staff_id).await?;
    let service = state.catalogue_repo.find_service(&params.service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    let grid = state.checker.day_grid(&staff.id, date, service.duration_minutes).await?;
    let slots = grid.into_iter()
        .map(|(time, decision)| SlotResponse {
            time: time.format("%H:%M").to_string(),
            available: decision.is_available(),
            reason: decision.reason(),
        })
        .collect();

    Ok(Json(SlotsResponse {
        staff_id: staff.id,
        date: date.to_string(),
        service_id: service.id,
        duration_minutes: service.duration_minutes,
        slots,
    }))
}
