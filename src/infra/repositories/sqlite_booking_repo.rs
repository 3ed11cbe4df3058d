use crate::domain::{
    models::booking::{BookedSlot, Booking, BookingHistory, BookingStatus},
    ports::{BookingRepository, SlotGuard},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use chrono::{NaiveDate, NaiveTime, Utc};

const ACTIVE_SLOTS_SQL: &str =
    "SELECT b.id AS booking_id, b.appointment_time, s.duration_minutes
     FROM bookings b JOIN services s ON s.id = b.service_id
     WHERE b.staff_id = ? AND b.appointment_date = ? AND b.status != 'cancelled'
     ORDER BY b.appointment_time ASC";

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn other_active_slots(conn: &mut SqliteConnection, staff_id: &str, date: NaiveDate, booking_id: &str) -> Result<Vec<BookedSlot>, AppError> {
    let mut slots = sqlx::query_as::<_, BookedSlot>(ACTIVE_SLOTS_SQL)
        .bind(staff_id)
        .bind(date)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    slots.retain(|s| s.booking_id != booking_id);
    Ok(slots)
}

async fn insert_history(conn: &mut SqliteConnection, history: &BookingHistory) -> Result<(), AppError> {
    sqlx::query("INSERT INTO booking_history (id, booking_id, action, user_id, notes, created_at) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(&history.id)
        .bind(&history.booking_id)
        .bind(history.action.as_str())
        .bind(&history.user_id)
        .bind(&history.notes)
        .bind(history.created_at)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn list_active_slots(&self, staff_id: &str, date: NaiveDate) -> Result<Vec<BookedSlot>, AppError> {
        sqlx::query_as::<_, BookedSlot>(ACTIVE_SLOTS_SQL)
            .bind(staff_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_checked(&self, booking: &Booking, history: &BookingHistory, is_free: SlotGuard<'_>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Writing first takes the database write lock, so no other booking can
        // land between the scan below and the commit.
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, client_id, staff_id, service_id, appointment_date, appointment_time, status, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.client_id).bind(&booking.staff_id).bind(&booking.service_id)
            .bind(booking.appointment_date).bind(booking.appointment_time).bind(booking.status.as_str())
            .bind(&booking.notes).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let others = other_active_slots(&mut tx, &created.staff_id, created.appointment_date, &created.id).await?;
        if !is_free(&others) {
            return Err(AppError::Conflict("Staff member was booked for this time in the meantime".into()));
        }

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

        let moved = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET appointment_date = ?, appointment_time = ?, updated_at = ?
             WHERE id = ? AND status IN ('pending', 'confirmed')
             RETURNING *"
        )
            .bind(date).bind(time).bind(Utc::now()).bind(&booking.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking can no longer be rescheduled".into()))?;

        let others = other_active_slots(&mut tx, &moved.staff_id, date, &moved.id).await?;
        if !is_free(&others) {
            return Err(AppError::Conflict("Staff member was booked for this time in the meantime".into()));
        }

        insert_history(&mut tx, history).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(moved)
    }

    async fn update_status(&self, booking_id: &str, from: BookingStatus, to: BookingStatus, history: &BookingHistory) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *"
        )
            .bind(to.as_str()).bind(Utc::now()).bind(booking_id).bind(from.as_str())
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking status changed concurrently".into()))?;

        insert_history(&mut tx, history).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_client(&self, client_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE client_id = ? ORDER BY appointment_date DESC, appointment_time DESC"
        ).bind(client_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_filtered(&self, staff_id: Option<&str>, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE (? IS NULL OR staff_id = ?) AND (? IS NULL OR appointment_date = ?)
             ORDER BY appointment_date ASC, appointment_time ASC"
        )
            .bind(staff_id).bind(staff_id).bind(date).bind(date)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_history(&self, booking_id: &str) -> Result<Vec<BookingHistory>, AppError> {
        sqlx::query_as::<_, BookingHistory>(
            "SELECT * FROM booking_history WHERE booking_id = ? ORDER BY created_at DESC"
        ).bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
