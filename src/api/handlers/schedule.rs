use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::Actor;
use crate::api::dtos::requests::{DateRangeQuery, SpecialHoursRequest, WorkingHoursRequest};
use crate::api::handlers::{load_staff, parse_date, parse_time};
use crate::domain::models::{schedule::{SpecialHours, WorkingHours}, user::Role};
use crate::domain::services::validation::{validate_special_hours, validate_working_hours};
use crate::error::AppError;
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

/// Default window for listing special hours when no range is given.
const SPECIAL_HOURS_LOOKAHEAD_DAYS: i64 = 90;

/// Admins see every schedule; staff members only their own.
fn can_read_schedule(actor: &Actor, staff_id: &str) -> Result<(), AppError> {
    match actor.0.role {
        Role::Admin => Ok(()),
        Role::Staff if actor.0.id == staff_id => Ok(()),
        _ => Err(AppError::Forbidden("Not allowed to view this schedule".into())),
    }
}

pub async fn list_working_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(staff_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    can_read_schedule(&actor, &staff_id)?;
    let staff = load_staff(&state, &staff_id).await?;
    Ok(Json(state.schedule_repo.list_working_hours(&staff.id).await?))
}

pub async fn upsert_working_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(staff_id): Path<String>,
    Json(payload): Json<WorkingHoursRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    let staff = load_staff(&state, &staff_id).await?;

    let mut hours = WorkingHours::new(
        staff.id,
        payload.day_of_week,
        parse_time(&payload.start_time, "start_time")?,
        parse_time(&payload.end_time, "end_time")?,
    );
    hours.is_active = payload.is_active.unwrap_or(true);
    validate_working_hours(&hours).map_err(AppError::Validation)?;

    let saved = state.schedule_repo.upsert_working_hours(&hours).await?;
    info!("Set working hours for staff {} on day {}: {}-{}", saved.staff_id, saved.day_of_week, saved.start_time, saved.end_time);
    Ok(Json(saved))
}

pub async fn delete_working_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path((staff_id, day)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    state.schedule_repo.delete_working_hours(&staff_id, day).await?;
    info!("Deleted working hours for staff {} on day {}", staff_id, day);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn list_special_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(staff_id): Path<String>,
    Query(params): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    can_read_schedule(&actor, &staff_id)?;
    let staff = load_staff(&state, &staff_id).await?;

    let start = match params.start.as_deref() {
        Some(raw) => parse_date(raw, "start")?,
        None => state.booking_service.now_local().date(),
    };
    let end = match params.end.as_deref() {
        Some(raw) => parse_date(raw, "end")?,
        None => start + Duration::days(SPECIAL_HOURS_LOOKAHEAD_DAYS),
    };
    if end < start {
        return Err(AppError::Validation("end must not be before start".into()));
    }

    Ok(Json(state.schedule_repo.list_special_hours(&staff.id, start, end).await?))
}

pub async fn upsert_special_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(staff_id): Path<String>,
    Json(payload): Json<SpecialHoursRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    let staff = load_staff(&state, &staff_id).await?;
    let date = parse_date(&payload.date, "date")?;

    let mut hours = SpecialHours::day_off(staff.id, date);
    hours.start_time = payload.start_time.as_deref().map(|t| parse_time(t, "start_time")).transpose()?;
    hours.end_time = payload.end_time.as_deref().map(|t| parse_time(t, "end_time")).transpose()?;
    hours.note = payload.note.unwrap_or_default();
    validate_special_hours(&hours).map_err(AppError::Validation)?;

    let saved = state.schedule_repo.upsert_special_hours(&hours).await?;
    match saved.hours() {
        Some((start, end)) => info!("Set special hours for staff {} on {}: {}-{}", saved.staff_id, saved.date, start, end),
        None => info!("Marked staff {} off on {}", saved.staff_id, saved.date),
    }
    Ok(Json(saved))
}

pub async fn delete_special_hours(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path((staff_id, date_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    let date = parse_date(&date_str, "date")?;
    state.schedule_repo.delete_special_hours(&staff_id, date).await?;
    info!("Deleted special hours for staff {} on {}", staff_id, date);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
