use crate::domain::{models::schedule::{SpecialHours, WorkingHours}, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn upsert_working_hours(&self, hours: &WorkingHours) -> Result<WorkingHours, AppError> {
        sqlx::query_as::<_, WorkingHours>(
            r#"INSERT INTO working_hours (id, staff_id, day_of_week, start_time, end_time, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(staff_id, day_of_week) DO UPDATE SET
               start_time=excluded.start_time,
               end_time=excluded.end_time,
               is_active=excluded.is_active
               RETURNING *"#
        )
            .bind(&hours.id)
            .bind(&hours.staff_id)
            .bind(hours.day_of_week)
            .bind(hours.start_time)
            .bind(hours.end_time)
            .bind(hours.is_active)
            .bind(hours.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_active_working_hours(&self, staff_id: &str, day_of_week: i32) -> Result<Option<WorkingHours>, AppError> {
        sqlx::query_as::<_, WorkingHours>(
            "SELECT * FROM working_hours WHERE staff_id = ? AND day_of_week = ? AND is_active = 1"
        )
            .bind(staff_id)
            .bind(day_of_week)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_working_hours(&self, staff_id: &str) -> Result<Vec<WorkingHours>, AppError> {
        sqlx::query_as::<_, WorkingHours>(
            "SELECT * FROM working_hours WHERE staff_id = ? ORDER BY day_of_week ASC"
        )
            .bind(staff_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_working_hours(&self, staff_id: &str, day_of_week: i32) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM working_hours WHERE staff_id = ? AND day_of_week = ?")
            .bind(staff_id)
            .bind(day_of_week)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Working hours not found".into()));
        }
        Ok(())
    }

    async fn upsert_special_hours(&self, hours: &SpecialHours) -> Result<SpecialHours, AppError> {
        sqlx::query_as::<_, SpecialHours>(
            r#"INSERT INTO special_hours (id, staff_id, date, start_time, end_time, note, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(staff_id, date) DO UPDATE SET
               start_time=excluded.start_time,
               end_time=excluded.end_time,
               note=excluded.note
               RETURNING *"#
        )
            .bind(&hours.id)
            .bind(&hours.staff_id)
            .bind(hours.date)
            .bind(hours.start_time)
            .bind(hours.end_time)
            .bind(&hours.note)
            .bind(hours.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_special_hours(&self, staff_id: &str, date: NaiveDate) -> Result<Option<SpecialHours>, AppError> {
        sqlx::query_as::<_, SpecialHours>(
            "SELECT * FROM special_hours WHERE staff_id = ? AND date = ?"
        )
            .bind(staff_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_special_hours(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<SpecialHours>, AppError> {
        sqlx::query_as::<_, SpecialHours>(
            "SELECT * FROM special_hours WHERE staff_id = ? AND date >= ? AND date <= ? ORDER BY date ASC"
        )
            .bind(staff_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_special_hours(&self, staff_id: &str, date: NaiveDate) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM special_hours WHERE staff_id = ? AND date = ?")
            .bind(staff_id)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Special hours not found".into()));
        }
        Ok(())
    }
}
