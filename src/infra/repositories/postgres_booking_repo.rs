use crate::domain::{
    models::booking::{BookedSlot, Booking, BookingHistory, BookingStatus},
    ports::{BookingRepository, SlotGuard},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use chrono::{NaiveDate, NaiveTime, Utc};

const ACTIVE_SLOTS_SQL: &str =
    "SELECT b.id AS booking_id, b.appointment_time, s.duration_minutes
     FROM bookings b JOIN services s ON s.id = b.service_id
     WHERE b.staff_id = $1 AND b.appointment_date = $2 AND b.status != 'cancelled'
     ORDER BY b.appointment_time ASC";

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Serializes writers for one staff member's day until the transaction ends.
async fn lock_staff_day(conn: &mut PgConnection, staff_id: &str, date: NaiveDate) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(format!("{}:{}", staff_id, date))
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

async fn other_active_slots(conn: &mut PgConnection, staff_id: &str, date: NaiveDate, booking_id: &str) -> Result<Vec<BookedSlot>, AppError> {
    let mut slots = sqlx::query_as::<_, BookedSlot>(ACTIVE_SLOTS_SQL)
        .bind(staff_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    slots.retain(|s| s.booking_id != booking_id);
    Ok(slots)
}

async fn insert_history(conn: &mut PgConnection, history: &BookingHistory) -> Result<(), AppError> {
    sqlx::query("INSERT INTO booking_history (id, booking_id, action, user_id, notes, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
        .bind(&history.id).bind(&history.booking_id).bind(history.action.as_str())
        .bind(&history.user_id).bind(&history.notes).bind(history.created_at)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn list_active_slots(&self, staff_id: &str, date: NaiveDate) -> Result<Vec<BookedSlot>, AppError> {
        sqlx::query_as::<_, BookedSlot>(ACTIVE_SLOTS_SQL)
            .bind(staff_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_checked(&self, booking: &Booking, history: &BookingHistory, is_free: SlotGuard<'_>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_staff_day(&mut tx, &booking.staff_id, booking.appointment_date).await?;

        let others = other_active_slots(&mut tx, &booking.staff_id, booking.appointment_date, &booking.id).await?;
        if !is_free(&others) {
            return Err(AppError::Conflict("Staff member was booked for this time in the meantime".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, client_id, staff_id, service_id, appointment_date, appointment_time, status, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.client_id).bind(&booking.staff_id).bind(&booking.service_id)
            .bind(booking.appointment_date).bind(booking.appointment_time).bind(booking.status.as_str())
            .bind(&booking.notes).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        insert_history(&mut tx, history).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn reschedule_checked(
        &self,
        booking: &Booking,
        date: NaiveDate,
        time: NaiveTime,
        history: &BookingHistory,
        is_free: SlotGuard<'_>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        lock_staff_day(&mut tx, &booking.staff_id, date).await?;

        let others = other_active_slots(&mut tx, &booking.staff_id, date, &booking.id).await?;
        if !is_free(&others) {
            return Err(AppError::Conflict("Staff member was booked for this time in the meantime".into()));
        }

        let moved = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET appointment_date = $1, appointment_time = $2, updated_at = $3
             WHERE id = $4 AND status IN ('pending', 'confirmed')
             RETURNING *"
        )
            .bind(date).bind(time).bind(Utc::now()).bind(&booking.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking can no longer be rescheduled".into()))?;

        insert_history(&mut tx, history).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(moved)
    }

    async fn update_status(&self, booking_id: &str, from: BookingStatus, to: BookingStatus, history: &BookingHistory) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING *"
        )
            .bind(to.as_str()).bind(Utc::now()).bind(booking_id).bind(from.as_str())
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking status changed concurrently".into()))?;

        insert_history(&mut tx, history).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_client(&self, client_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE client_id = $1 ORDER BY appointment_date DESC, appointment_time DESC"
        ).bind(client_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_filtered(&self, staff_id: Option<&str>, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE ($1::TEXT IS NULL OR staff_id = $1) AND ($2::DATE IS NULL OR appointment_date = $2)
             ORDER BY appointment_date ASC, appointment_time ASC"
        )
            .bind(staff_id).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_history(&self, booking_id: &str) -> Result<Vec<BookingHistory>, AppError> {
        sqlx::query_as::<_, BookingHistory>(
            "SELECT * FROM booking_history WHERE booking_id = $1 ORDER BY created_at DESC"
        ).bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
