use std::sync::Arc;
use crate::domain::ports::{BookingRepository, CatalogueRepository, ScheduleRepository, UserRepository};
use crate::domain::services::{availability::AvailabilityChecker, booking_service::BookingService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub catalogue_repo: Arc<dyn CatalogueRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub checker: Arc<AvailabilityChecker>,
    pub booking_service: Arc<BookingService>,
}

impl AppState {
    /// Wires the domain services on top of a set of repositories.
    pub fn from_repos(
        config: Config,
        user_repo: Arc<dyn UserRepository>,
        catalogue_repo: Arc<dyn CatalogueRepository>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        let checker = Arc::new(AvailabilityChecker::new(
            schedule_repo.clone(),
            booking_repo.clone(),
            config.conflict_policy,
        ));
        let booking_service = Arc::new(BookingService::new(
            user_repo.clone(),
            catalogue_repo.clone(),
            booking_repo.clone(),
            checker.clone(),
            config.timezone,
        ));

        Self { config, user_repo, catalogue_repo, schedule_repo, booking_repo, checker, booking_service }
    }
}
