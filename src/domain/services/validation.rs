use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use crate::domain::models::catalogue::Service;
use crate::domain::models::schedule::{SpecialHours, WorkingHours};
use crate::domain::models::user::{Role, User};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Same-day bookings must start later than now plus this many minutes.
pub const SAME_DAY_BUFFER_MIN: i64 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingViolation {
    #[error("Only clients can book appointments")]
    ClientRole,
    #[error("Selected staff member is not a staff user")]
    StaffRole,
    #[error("Selected staff member is inactive")]
    InactiveStaff,
    #[error("Service is inactive")]
    InactiveService,
    #[error("Cannot book a date in the past")]
    PastDate,
    #[error("Same-day bookings must start at least 5 minutes from now")]
    TooSoon,
}

impl BookingViolation {
    pub fn code(&self) -> &'static str {
        match self {
            BookingViolation::ClientRole => "client_role",
            BookingViolation::StaffRole => "staff_role",
            BookingViolation::InactiveStaff => "inactive_staff",
            BookingViolation::InactiveService => "inactive_service",
            BookingViolation::PastDate => "past_date",
            BookingViolation::TooSoon => "too_soon",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<BookingViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn contains(&self, violation: &BookingViolation) -> bool {
        self.violations.contains(violation)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.violations
                .iter()
                .map(|v| json!({ "code": v.code(), "message": v.to_string() }))
                .collect(),
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.violations.iter().map(BookingViolation::code).collect();
        write!(f, "[{}]", codes.join(", "))
    }
}

pub struct BookingCandidate<'a> {
    pub client: &'a User,
    pub staff: &'a User,
    pub service: &'a Service,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Runs every pre-write check and collects all violations. `now` is the
/// salon's local wall-clock time.
pub fn validate_booking(candidate: &BookingCandidate<'_>, now: NaiveDateTime) -> ValidationReport {
    let mut violations = Vec::new();

    if candidate.client.role != Role::Client {
        violations.push(BookingViolation::ClientRole);
    }
    if candidate.staff.role != Role::Staff {
        violations.push(BookingViolation::StaffRole);
    } else if !candidate.staff.is_active {
        violations.push(BookingViolation::InactiveStaff);
    }
    if !candidate.service.is_active {
        violations.push(BookingViolation::InactiveService);
    }
    violations.extend(check_timing(candidate.date, candidate.time, now));

    ValidationReport { violations }
}

/// Checks for moving an existing booking. The booked service stays, so its
/// deactivation is not a violation here.
pub fn validate_reschedule(candidate: &BookingCandidate<'_>, now: NaiveDateTime) -> ValidationReport {
    let mut report = validate_booking(candidate, now);
    report.violations.retain(|v| *v != BookingViolation::InactiveService);
    report
}

fn check_timing(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Option<BookingViolation> {
    let today = now.date();
    if date < today {
        return Some(BookingViolation::PastDate);
    }
    if date == today {
        let earliest = now + Duration::minutes(SAME_DAY_BUFFER_MIN);
        if date.and_time(time) <= earliest {
            return Some(BookingViolation::TooSoon);
        }
    }
    None
}

pub fn validate_working_hours(hours: &WorkingHours) -> Result<(), String> {
    if !(0..=6).contains(&hours.day_of_week) {
        return Err("day_of_week must be between 0 (Monday) and 6 (Sunday)".into());
    }
    if hours.start_time >= hours.end_time {
        return Err("start_time must be before end_time".into());
    }
    Ok(())
}

pub fn validate_special_hours(hours: &SpecialHours) -> Result<(), String> {
    match (hours.start_time, hours.end_time) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err("start_time must be before end_time".into()),
        _ => Err("start_time and end_time must both be set or both be empty".into()),
    }
}
