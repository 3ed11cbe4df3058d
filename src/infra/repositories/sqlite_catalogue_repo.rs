use crate::domain::{models::catalogue::{Service, ServiceCategory}, ports::CatalogueRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCatalogueRepo {
    pool: SqlitePool,
}

impl SqliteCatalogueRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueRepository for SqliteCatalogueRepo {
    async fn create_category(&self, category: &ServiceCategory) -> Result<ServiceCategory, AppError> {
        sqlx::query_as::<_, ServiceCategory>(
            "INSERT INTO service_categories (id, name, is_active, created_at) VALUES (?, ?, ?, ?) RETURNING *"
        )
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.is_active)
            .bind(category.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_category(&self, id: &str) -> Result<Option<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_categories(&self) -> Result<Vec<ServiceCategory>, AppError> {
        sqlx::query_as::<_, ServiceCategory>("SELECT * FROM service_categories WHERE is_active = 1 ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_service(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, category_id, name, description, duration_minutes, price_cents, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&service.id)
            .bind(&service.category_id)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.duration_minutes)
            .bind(service.price_cents)
            .bind(service.is_active)
            .bind(service.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_services(&self, category_id: Option<&str>, active_only: bool) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            "SELECT * FROM services
             WHERE (? IS NULL OR category_id = ?) AND (? = 0 OR is_active = 1)
             ORDER BY name ASC"
        )
            .bind(category_id)
            .bind(category_id)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_service(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services SET name=?, description=?, duration_minutes=?, price_cents=?, is_active=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.duration_minutes)
            .bind(service.price_cents)
            .bind(service.is_active)
            .bind(&service.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
