use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::Actor;
use crate::api::dtos::requests::CreateUserRequest;
use crate::domain::models::user::{Role, User};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;

    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if state.user_repo.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let specialization_id = match payload.specialization_id {
        Some(id) if payload.role == Role::Staff => {
            state.catalogue_repo.find_category(&id).await?
                .ok_or(AppError::NotFound("Category not found".into()))?;
            Some(id)
        }
        Some(_) => return Err(AppError::Validation("Only staff members can have a specialization".into())),
        None => None,
    };

    let mut user = User::new(username.to_string(), payload.role);
    user.first_name = payload.first_name.unwrap_or_default();
    user.last_name = payload.last_name.unwrap_or_default();
    user.email = payload.email.unwrap_or_default();
    user.phone = payload.phone.unwrap_or_default();
    user.specialization_id = specialization_id;

    let created = state.user_repo.create(&user).await?;
    info!("Created {} user {} ({})", created.role, created.username, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}
