use crate::domain::models::{booking::BookingStatus, user::Role};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ServicesQuery {
    pub category_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization_id: Option<String>,
}

#[derive(Deserialize)]
pub struct StaffQuery {
    pub specialization_id: Option<String>,
}

/// Times are "HH:MM" in salon-local time.
#[derive(Deserialize)]
pub struct WorkingHoursRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_active: Option<bool>,
}

/// Leaving both times out marks the date as a day off.
#[derive(Deserialize)]
pub struct SpecialHoursRequest {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub time: String,
    pub service_id: String,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub service_id: String,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub staff_id: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub staff_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}
