pub mod availability;
pub mod booking;
pub mod catalogue;
pub mod health;
pub mod schedule;
pub mod staff;
pub mod users;

use crate::domain::models::user::{Role, User};
use crate::error::AppError;
use crate::state::AppState;
use chrono::{NaiveDate, NaiveTime};

pub(crate) fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {}: expected YYYY-MM-DD", field)))
}

/// Accepts "HH:MM" and "HH:MM:SS".
pub(crate) fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {}: expected HH:MM", field)))
}

/// Loads a user with the staff role, active or not.
pub(crate) async fn load_staff(state: &AppState, staff_id: &str) -> Result<User, AppError> {
    state.user_repo.find_by_id(staff_id).await?
        .filter(|u| u.role == Role::Staff)
        .ok_or(AppError::NotFound("Staff member not found".into()))
}

/// Like `load_staff`, but a deactivated staff member is not found.
pub(crate) async fn load_active_staff(state: &AppState, staff_id: &str) -> Result<User, AppError> {
    Some(load_staff(state, staff_id).await?)
        .filter(|u| u.is_active)
        .ok_or(AppError::NotFound("Staff member not found".into()))
}
