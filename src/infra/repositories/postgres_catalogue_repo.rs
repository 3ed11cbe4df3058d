use crate::domain::{models::catalogue::{Service, ServiceCategory}, ports::CatalogueRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCatalogueRepo {
    pool: PgPool,
}

impl PostgresCatalogueRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueRepository for PostgresCatalogueRepo {
    async fn create_category(&self, category: &ServiceCategory) -> Result<ServiceCategory, AppError> {
        sqlx::query_as::<_, ServiceCategory>(
            "INSERT INTO service_categories (id, name, is_active, created_at) VALUES ($1, $2, $3, $4) RETURNING *"
        )
            .bind(&category.id).bind(&category.name).bind(category.is_active).bind(category.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_category(&self, id: &str) -> Result<Option<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_categories(&self) -> Result<Vec<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories WHERE is_active = TRUE ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_service(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, category_id, name, description, duration_minutes, price_cents, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&service.id).bind(&service.category_id).bind(&service.name).bind(&service.description)
            .bind(service.duration_minutes).bind(service.price_cents).bind(service.is_active).bind(service.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_services(&self, category_id: Option<&str>, active_only: bool) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT * FROM services
             WHERE ($1::TEXT IS NULL OR category_id = $1) AND (NOT $2 OR is_active = TRUE)
             ORDER BY name ASC"
        )
            .bind(category_id).bind(active_only)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_service(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services SET name=$1, description=$2, duration_minutes=$3, price_cents=$4, is_active=$5
             WHERE id=$6
             RETURNING *"
        )
            .bind(&service.name).bind(&service.description).bind(service.duration_minutes)
            .bind(service.price_cents).bind(service.is_active).bind(&service.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
