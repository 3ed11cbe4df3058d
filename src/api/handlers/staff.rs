use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::StaffQuery, responses::StaffResponse};
use crate::domain::models::user::Role;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StaffQuery>,
) -> Result<impl IntoResponse, AppError> {
    let staff = state.user_repo.list_by_role(Role::Staff, params.specialization_id.as_deref()).await?;
    let response: Vec<StaffResponse> = staff.into_iter().map(StaffResponse::from).collect();
    Ok(Json(response))
}
