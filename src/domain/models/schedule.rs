use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// Recurring weekly window. `day_of_week` is 0 for Monday through 6 for Sunday.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WorkingHours {
    pub id: String,
    pub staff_id: String,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkingHours {
    pub fn new(staff_id: String, day_of_week: i32, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            staff_id,
            day_of_week,
            start_time,
            end_time,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Date-specific override. No times at all means the staff member is off that day.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SpecialHours {
    pub id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl SpecialHours {
    pub fn day_off(staff_id: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            staff_id,
            date,
            start_time: None,
            end_time: None,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn window(staff_id: String, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Self::day_off(staff_id, date)
        }
    }

    /// The override window, or `None` when the record marks a day off.
    pub fn hours(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}
