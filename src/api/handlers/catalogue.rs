use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::actor::Actor;
use crate::api::dtos::requests::{CreateCategoryRequest, CreateServiceRequest, ServicesQuery, UpdateServiceRequest};
use crate::domain::models::catalogue::{CategoryWithServices, NewServiceParams, Service, ServiceCategory};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Active categories, each with its active services.
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let categories = state.catalogue_repo.list_active_categories().await?;

    let mut by_category: HashMap<String, Vec<Service>> = HashMap::new();
    for service in state.catalogue_repo.list_services(None, true).await? {
        by_category.entry(service.category_id.clone()).or_default().push(service);
    }

    let result: Vec<CategoryWithServices> = categories.into_iter()
        .map(|category| {
            let services = by_category.remove(&category.id).unwrap_or_default();
            CategoryWithServices { category, services }
        })
        .collect();
    Ok(Json(result))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }

    let created = state.catalogue_repo.create_category(&ServiceCategory::new(name.to_string())).await?;
    info!("Created service category {} ({})", created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ServicesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.catalogue_repo.list_services(params.category_id.as_deref(), true).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.catalogue_repo.find_service(&service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

fn check_service_fields(name: &str, duration_minutes: i32, price_cents: i64) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Service name is required".into()));
    }
    if duration_minutes <= 0 {
        return Err(AppError::Validation("duration_minutes must be positive".into()));
    }
    if price_cents < 0 {
        return Err(AppError::Validation("price_cents must not be negative".into()));
    }
    Ok(())
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    check_service_fields(&payload.name, payload.duration_minutes, payload.price_cents)?;

    state.catalogue_repo.find_category(&payload.category_id).await?
        .ok_or(AppError::NotFound("Category not found".into()))?;

    let service = Service::new(NewServiceParams {
        category_id: payload.category_id,
        name: payload.name.trim().to_string(),
        description: payload.description.unwrap_or_default(),
        duration_minutes: payload.duration_minutes,
        price_cents: payload.price_cents,
    });

    let created = state.catalogue_repo.create_service(&service).await?;
    info!("Created service {} ({} min)", created.id, created.duration_minutes);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(service_id): Path<String>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    let mut service = state.catalogue_repo.find_service(&service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if let Some(name) = payload.name { service.name = name.trim().to_string(); }
    if let Some(description) = payload.description { service.description = description; }
    if let Some(duration) = payload.duration_minutes { service.duration_minutes = duration; }
    if let Some(price) = payload.price_cents { service.price_cents = price; }
    if let Some(active) = payload.is_active { service.is_active = active; }
    check_service_fields(&service.name, service.duration_minutes, service.price_cents)?;

    let updated = state.catalogue_repo.update_service(&service).await?;
    info!("Updated service {}", updated.id);
    Ok(Json(updated))
}
