use crate::domain::models::{
    booking::{BookedSlot, Booking, BookingHistory, BookingStatus},
    catalogue::{Service, ServiceCategory},
    schedule::{SpecialHours, WorkingHours},
    user::{Role, User},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

/// Conflict re-check run by the repository inside the write transaction.
/// Receives the day's other active slots (never the booking being written)
/// and returns `true` while the slot is still free.
pub type SlotGuard<'a> = &'a (dyn Fn(&[BookedSlot]) -> bool + Send + Sync);

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_by_role(&self, role: Role, specialization_id: Option<&str>) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    async fn create_category(&self, category: &ServiceCategory) -> Result<ServiceCategory, AppError>;
    async fn find_category(&self, id: &str) -> Result<Option<ServiceCategory>, AppError>;
    async fn list_active_categories(&self) -> Result<Vec<ServiceCategory>, AppError>;

    async fn create_service(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_service(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list_services(&self, category_id: Option<&str>, active_only: bool) -> Result<Vec<Service>, AppError>;
    async fn update_service(&self, service: &Service) -> Result<Service, AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn upsert_working_hours(&self, hours: &WorkingHours) -> Result<WorkingHours, AppError>;
    async fn find_active_working_hours(&self, staff_id: &str, day_of_week: i32) -> Result<Option<WorkingHours>, AppError>;
    async fn list_working_hours(&self, staff_id: &str) -> Result<Vec<WorkingHours>, AppError>;
    async fn delete_working_hours(&self, staff_id: &str, day_of_week: i32) -> Result<(), AppError>;

    async fn upsert_special_hours(&self, hours: &SpecialHours) -> Result<SpecialHours, AppError>;
    async fn find_special_hours(&self, staff_id: &str, date: NaiveDate) -> Result<Option<SpecialHours>, AppError>;
    async fn list_special_hours(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<SpecialHours>, AppError>;
    async fn delete_special_hours(&self, staff_id: &str, date: NaiveDate) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Non-cancelled bookings of `staff_id` on `date`, with their service duration.
    async fn list_active_slots(&self, staff_id: &str, date: NaiveDate) -> Result<Vec<BookedSlot>, AppError>;

    /// Inserts `booking` and its `created` history entry in one transaction
    /// serialized per (staff, date). Fails with `Conflict` when `is_free`
    /// rejects the slots read inside that transaction.
    async fn create_checked(&self, booking: &Booking, history: &BookingHistory, is_free: SlotGuard<'_>) -> Result<Booking, AppError>;

    /// Moves a booking to a new date and time under the same locking as
    /// `create_checked`.
    async fn reschedule_checked(
        &self,
        booking: &Booking,
        date: NaiveDate,
        time: NaiveTime,
        history: &BookingHistory,
        is_free: SlotGuard<'_>,
    ) -> Result<Booking, AppError>;

    /// Writes `to` only if the booking is still in `from`, then appends `history`.
    async fn update_status(&self, booking_id: &str, from: BookingStatus, to: BookingStatus, history: &BookingHistory) -> Result<Booking, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_client(&self, client_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_filtered(&self, staff_id: Option<&str>, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError>;
    async fn list_history(&self, booking_id: &str) -> Result<Vec<BookingHistory>, AppError>;
}
