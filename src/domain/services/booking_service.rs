use std::sync::Arc;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use crate::domain::{
    models::{
        booking::{BookedSlot, Booking, BookingHistory, BookingStatus, HistoryAction, NewBookingParams},
        user::{Role, User},
    },
    ports::{BookingRepository, CatalogueRepository, UserRepository},
    services::{
        availability::{find_conflict, AvailabilityChecker},
        validation::{validate_booking, validate_reschedule, BookingCandidate},
    },
};
use crate::error::AppError;
use tracing::{info, warn};

pub struct NewBookingRequest {
    pub staff_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

/// Booking lifecycle: validate, check availability, persist, audit.
pub struct BookingService {
    user_repo: Arc<dyn UserRepository>,
    catalogue_repo: Arc<dyn CatalogueRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    checker: Arc<AvailabilityChecker>,
    timezone: Tz,
}

impl BookingService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        catalogue_repo: Arc<dyn CatalogueRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        checker: Arc<AvailabilityChecker>,
        timezone: Tz,
    ) -> Self {
        Self { user_repo, catalogue_repo, booking_repo, checker, timezone }
    }

    /// Wall-clock time at the salon.
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    pub async fn create(&self, client: &User, request: NewBookingRequest) -> Result<Booking, AppError> {
        let staff = self.user_repo.find_by_id(&request.staff_id).await?
            .ok_or(AppError::NotFound("Staff member not found".into()))?;
        let service = self.catalogue_repo.find_service(&request.service_id).await?
            .ok_or(AppError::NotFound("Service not found".into()))?;

        let report = validate_booking(&BookingCandidate {
            client,
            staff: &staff,
            service: &service,
            date: request.date,
            time: request.time,
        }, self.now_local());

        if !report.is_valid() {
            warn!("Booking rejected by validation: {}", report);
            return Err(AppError::Rejected(report));
        }

        let decision = self.checker.check(&staff.id, request.date, request.time, service.duration_minutes).await?;
        if !decision.is_available() {
            warn!(
                staff_id = %staff.id,
                date = %request.date,
                time = %request.time,
                reason = decision.reason(),
                "Booking rejected: slot not available"
            );
            return Err(AppError::Conflict(decision.message().into()));
        }

        let booking = Booking::new(NewBookingParams {
            client_id: client.id.clone(),
            staff_id: staff.id.clone(),
            service_id: service.id.clone(),
            date: request.date,
            time: request.time,
            notes: request.notes,
        });
        let history = BookingHistory::new(booking.id.clone(), HistoryAction::Created, Some(client.id.clone()), None);

        let policy = self.checker.policy();
        let duration = service.duration_minutes;
        let time = request.time;
        let is_free = move |slots: &[BookedSlot]| find_conflict(slots, time, duration, policy).is_none();

        let created = self.booking_repo.create_checked(&booking, &history, &is_free).await?;
        info!("Booking created: {} (staff {}, {} {})", created.id, created.staff_id, created.appointment_date, created.appointment_time);
        Ok(created)
    }

    pub async fn transition(&self, actor: &User, booking_id: &str, to: BookingStatus, notes: Option<String>) -> Result<Booking, AppError> {
        let booking = self.load(booking_id).await?;

        if !can_manage(actor, &booking) {
            return Err(AppError::Forbidden("Only the assigned staff member or an admin can change this booking".into()));
        }

        self.apply_transition(actor, &booking, to, notes).await
    }

    pub async fn cancel(&self, actor: &User, booking_id: &str, notes: Option<String>) -> Result<Booking, AppError> {
        let booking = self.load(booking_id).await?;

        if actor.id != booking.client_id && !can_manage(actor, &booking) {
            return Err(AppError::Forbidden("Not allowed to cancel this booking".into()));
        }

        self.apply_transition(actor, &booking, BookingStatus::Cancelled, notes).await
    }

    async fn apply_transition(&self, actor: &User, booking: &Booking, to: BookingStatus, notes: Option<String>) -> Result<Booking, AppError> {
        if !booking.status.can_transition_to(to) {
            return Err(AppError::Conflict(format!("Cannot change booking from {} to {}", booking.status, to)));
        }

        let history = BookingHistory::new(booking.id.clone(), HistoryAction::for_status(to), Some(actor.id.clone()), notes);
        let updated = self.booking_repo.update_status(&booking.id, booking.status, to, &history).await?;

        info!("Booking {} moved from {} to {} by {}", updated.id, booking.status, to, actor.id);
        Ok(updated)
    }

    pub async fn reschedule(
        &self,
        actor: &User,
        booking_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        notes: Option<String>,
    ) -> Result<Booking, AppError> {
        let booking = self.load(booking_id).await?;

        if actor.id != booking.client_id && !can_manage(actor, &booking) {
            return Err(AppError::Forbidden("Not allowed to reschedule this booking".into()));
        }
        if booking.status.is_terminal() {
            return Err(AppError::Conflict(format!("Cannot reschedule a {} booking", booking.status)));
        }

        let client = self.user_repo.find_by_id(&booking.client_id).await?
            .ok_or(AppError::Internal)?;
        let staff = self.user_repo.find_by_id(&booking.staff_id).await?
            .ok_or(AppError::Internal)?;
        let service = self.catalogue_repo.find_service(&booking.service_id).await?
            .ok_or(AppError::Internal)?;

        let report = validate_reschedule(&BookingCandidate {
            client: &client,
            staff: &staff,
            service: &service,
            date,
            time,
        }, self.now_local());
        if !report.is_valid() {
            return Err(AppError::Rejected(report));
        }

        let decision = self.checker
            .check_ignoring(&staff.id, date, time, service.duration_minutes, Some(&booking.id))
            .await?;
        if !decision.is_available() {
            return Err(AppError::Conflict(decision.message().into()));
        }

        let history = BookingHistory::new(
            booking.id.clone(),
            HistoryAction::Rescheduled,
            Some(actor.id.clone()),
            notes.or_else(|| Some(format!("{} {} -> {} {}", booking.appointment_date, booking.appointment_time.format("%H:%M"), date, time.format("%H:%M")))),
        );

        let policy = self.checker.policy();
        let duration = service.duration_minutes;
        let is_free = move |slots: &[BookedSlot]| find_conflict(slots, time, duration, policy).is_none();

        let updated = self.booking_repo.reschedule_checked(&booking, date, time, &history, &is_free).await?;
        info!("Rescheduled booking {} to {} {}", updated.id, date, time);
        Ok(updated)
    }

    pub async fn get(&self, actor: &User, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.load(booking_id).await?;
        if !can_view(actor, &booking) {
            return Err(AppError::Forbidden("Not allowed to view this booking".into()));
        }
        Ok(booking)
    }

    pub async fn history(&self, actor: &User, booking_id: &str) -> Result<Vec<BookingHistory>, AppError> {
        let booking = self.get(actor, booking_id).await?;
        self.booking_repo.list_history(&booking.id).await
    }

    async fn load(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
}

fn can_manage(actor: &User, booking: &Booking) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Staff => actor.id == booking.staff_id,
        Role::Client => false,
    }
}

fn can_view(actor: &User, booking: &Booking) -> bool {
    actor.id == booking.client_id || can_manage(actor, booking)
}
