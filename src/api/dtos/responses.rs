use crate::domain::models::user::User;
use crate::domain::services::availability::Availability;
use serde::Serialize;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub staff_id: String,
    pub date: String,
    pub time: String,
    pub service_id: String,
    pub duration_minutes: i32,
    pub available: bool,
    pub reason: &'static str,
    pub message: &'static str,
    pub conflicting_booking_id: Option<String>,
}

impl AvailabilityResponse {
    pub fn conflicting_id(decision: &Availability) -> Option<String> {
        match decision {
            Availability::Conflict { booking_id } => Some(booking_id.clone()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct SlotResponse {
    pub time: String,
    pub available: bool,
    pub reason: &'static str,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub staff_id: String,
    pub date: String,
    pub service_id: String,
    pub duration_minutes: i32,
    pub slots: Vec<SlotResponse>,
}

#[derive(Serialize)]
pub struct StaffResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub specialization_id: Option<String>,
}

impl From<User> for StaffResponse {
    fn from(u: User) -> Self {
        Self {
            display_name: u.display_name().to_string(),
            id: u.id,
            username: u.username,
            email: u.email,
            phone: u.phone,
            specialization_id: u.specialization_id,
        }
    }
}
