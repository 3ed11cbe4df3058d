use axum::{extract::FromRequestParts, http::request::Parts};
use crate::state::AppState;
use crate::domain::models::user::{Role, User};
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

pub const USER_HEADER: &str = "X-User-Id";

/// The active user named by the `X-User-Id` header.
pub struct Actor(pub User);

impl Actor {
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Admin])
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Role {} may not perform this action", self.0.role)))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let user_id = parts.headers.get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user = state.user_repo.find_by_id(user_id).await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", user.id.as_str());
        Ok(Actor(user))
    }
}
