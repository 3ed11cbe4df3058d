use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use crate::domain::models::booking::BookedSlot;
use crate::domain::models::schedule::{SpecialHours, WorkingHours};
use crate::domain::ports::{BookingRepository, ScheduleRepository};
use crate::error::AppError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Start times offered by the slot grid, on the hour from 09:00 to 18:00.
const GRID_FIRST_HOUR: u32 = 9;
const GRID_LAST_HOUR: u32 = 18;

/// How existing bookings are compared against a candidate interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Only an existing booking that *starts* inside `[start, start + duration)`
    /// conflicts. Ignores the existing booking's own length.
    StartWithin,
    /// Any existing booking whose own interval intersects the candidate conflicts.
    #[default]
    Overlap,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::StartWithin => "start_within",
            ConflictPolicy::Overlap => "overlap",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_within" => Ok(ConflictPolicy::StartWithin),
            "overlap" => Ok(ConflictPolicy::Overlap),
            other => Err(format!("unknown conflict policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    DayOff,
    OutsideSpecialHours,
    NoWorkingHours,
    OutsideWorkingHours,
    Conflict { booking_id: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::DayOff => "day_off",
            Availability::OutsideSpecialHours => "outside_special_hours",
            Availability::NoWorkingHours => "no_working_hours",
            Availability::OutsideWorkingHours => "outside_working_hours",
            Availability::Conflict { .. } => "conflict",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Availability::Available => "Staff member is available",
            Availability::DayOff => "Staff member is off on this date",
            Availability::OutsideSpecialHours => "Requested time is outside the adjusted hours for this date",
            Availability::NoWorkingHours => "Staff member does not work on this weekday",
            Availability::OutsideWorkingHours => "Requested time is outside working hours",
            Availability::Conflict { .. } => "Staff member is busy at the requested time",
        }
    }
}

/// Monday = 0 ... Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_monday() as i32
}

fn seconds_of_day(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64
}

/// Checks `time` against the schedule in force for the date. A special-hours
/// record, when present, replaces the weekly hours entirely. Both window ends
/// are inclusive.
pub fn check_schedule(
    time: NaiveTime,
    special: Option<&SpecialHours>,
    weekly: Option<&WorkingHours>,
) -> Availability {
    if let Some(special) = special {
        return match special.hours() {
            None => Availability::DayOff,
            Some((start, end)) if start <= time && time <= end => Availability::Available,
            Some(_) => Availability::OutsideSpecialHours,
        };
    }

    match weekly.filter(|w| w.is_active) {
        None => Availability::NoWorkingHours,
        Some(w) if w.start_time <= time && time <= w.end_time => Availability::Available,
        Some(_) => Availability::OutsideWorkingHours,
    }
}

/// The candidate end is `start + duration` in seconds from midnight and never
/// wraps into the next day.
pub fn find_conflict<'a>(
    existing: &'a [BookedSlot],
    time: NaiveTime,
    duration_minutes: i32,
    policy: ConflictPolicy,
) -> Option<&'a BookedSlot> {
    let start = seconds_of_day(time);
    let end = start + i64::from(duration_minutes) * 60;

    existing.iter().find(|booked| {
        let b_start = seconds_of_day(booked.appointment_time);
        match policy {
            ConflictPolicy::StartWithin => start <= b_start && b_start < end,
            ConflictPolicy::Overlap => {
                // Either interval occupies at least its start minute.
                let b_end = b_start + i64::from(booked.duration_minutes.max(1)) * 60;
                b_start < end.max(start + 60) && start < b_end
            }
        }
    })
}

pub fn evaluate(
    time: NaiveTime,
    duration_minutes: i32,
    special: Option<&SpecialHours>,
    weekly: Option<&WorkingHours>,
    existing: &[BookedSlot],
    policy: ConflictPolicy,
) -> Availability {
    let scheduled = check_schedule(time, special, weekly);
    if !scheduled.is_available() {
        return scheduled;
    }

    match find_conflict(existing, time, duration_minutes, policy) {
        Some(booked) => Availability::Conflict { booking_id: booked.booking_id.clone() },
        None => Availability::Available,
    }
}

pub fn slot_grid() -> Vec<NaiveTime> {
    (GRID_FIRST_HOUR..=GRID_LAST_HOUR)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .collect()
}

/// Reads schedules and bookings through the repository ports and applies
/// [`evaluate`]. Performs no writes.
pub struct AvailabilityChecker {
    schedule_repo: Arc<dyn ScheduleRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    policy: ConflictPolicy,
}

impl AvailabilityChecker {
    pub fn new(
        schedule_repo: Arc<dyn ScheduleRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        policy: ConflictPolicy,
    ) -> Self {
        Self { schedule_repo, booking_repo, policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub async fn is_available(
        &self,
        staff_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
    ) -> Result<bool, AppError> {
        Ok(self.check(staff_id, date, time, duration_minutes).await?.is_available())
    }

    pub async fn check(
        &self,
        staff_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
    ) -> Result<Availability, AppError> {
        self.check_ignoring(staff_id, date, time, duration_minutes, None).await
    }

    /// Same as [`Self::check`] but skips `ignore_booking_id` in the conflict
    /// scan, so a booking can be moved without colliding with itself.
    pub async fn check_ignoring(
        &self,
        staff_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i32,
        ignore_booking_id: Option<&str>,
    ) -> Result<Availability, AppError> {
        let special = self.schedule_repo.find_special_hours(staff_id, date).await?;
        let weekly = if special.is_none() {
            self.schedule_repo.find_active_working_hours(staff_id, weekday_index(date)).await?
        } else {
            None
        };

        let scheduled = check_schedule(time, special.as_ref(), weekly.as_ref());
        if !scheduled.is_available() {
            debug!(staff_id, %date, %time, reason = scheduled.reason(), "Slot outside schedule");
            return Ok(scheduled);
        }

        let mut existing = self.booking_repo.list_active_slots(staff_id, date).await?;
        if let Some(ignored) = ignore_booking_id {
            existing.retain(|b| b.booking_id != ignored);
        }

        let decision = evaluate(time, duration_minutes, special.as_ref(), weekly.as_ref(), &existing, self.policy);
        debug!(staff_id, %date, %time, duration_minutes, reason = decision.reason(), "Availability checked");
        Ok(decision)
    }

    /// Decision for every start time of [`slot_grid`] on `date`.
    pub async fn day_grid(
        &self,
        staff_id: &str,
        date: NaiveDate,
        duration_minutes: i32,
    ) -> Result<Vec<(NaiveTime, Availability)>, AppError> {
        let special = self.schedule_repo.find_special_hours(staff_id, date).await?;
        let weekly = if special.is_none() {
            self.schedule_repo.find_active_working_hours(staff_id, weekday_index(date)).await?
        } else {
            None
        };
        let existing = self.booking_repo.list_active_slots(staff_id, date).await?;

        Ok(slot_grid()
            .into_iter()
            .map(|t| {
                let decision = evaluate(t, duration_minutes, special.as_ref(), weekly.as_ref(), &existing, self.policy);
                (t, decision)
            })
            .collect())
    }
}
