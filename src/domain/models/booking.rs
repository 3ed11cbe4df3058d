use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// pending -> confirmed | cancelled
    /// confirmed -> completed | cancelled | no_show
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled)
                | (Confirmed, Completed) | (Confirmed, Cancelled) | (Confirmed, NoShow)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "no_show" => Ok(BookingStatus::NoShow),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub client_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: params.client_id,
            staff_id: params.staff_id,
            service_id: params.service_id,
            appointment_date: params.date,
            appointment_time: params.time,
            status: BookingStatus::Pending,
            notes: params.notes.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A non-cancelled booking as seen by the conflict scan.
#[derive(Debug, FromRow, Clone, PartialEq)]
pub struct BookedSlot {
    pub booking_id: String,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Confirmed,
    Cancelled,
    Rescheduled,
    Completed,
    NoShow,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Confirmed => "confirmed",
            HistoryAction::Cancelled => "cancelled",
            HistoryAction::Rescheduled => "rescheduled",
            HistoryAction::Completed => "completed",
            HistoryAction::NoShow => "no_show",
        }
    }

    /// The history action recorded when a booking enters `status`.
    pub fn for_status(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => HistoryAction::Created,
            BookingStatus::Confirmed => HistoryAction::Confirmed,
            BookingStatus::Completed => HistoryAction::Completed,
            BookingStatus::Cancelled => HistoryAction::Cancelled,
            BookingStatus::NoShow => HistoryAction::NoShow,
        }
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(HistoryAction::Created),
            "confirmed" => Ok(HistoryAction::Confirmed),
            "cancelled" => Ok(HistoryAction::Cancelled),
            "rescheduled" => Ok(HistoryAction::Rescheduled),
            "completed" => Ok(HistoryAction::Completed),
            "no_show" => Ok(HistoryAction::NoShow),
            other => Err(format!("unknown history action '{}'", other)),
        }
    }
}

impl TryFrom<String> for HistoryAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingHistory {
    pub id: String,
    pub booking_id: String,
    #[sqlx(try_from = "String")]
    pub action: HistoryAction,
    pub user_id: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl BookingHistory {
    pub fn new(booking_id: String, action: HistoryAction, user_id: Option<String>, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            action,
            user_id,
            notes: notes.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }
}
