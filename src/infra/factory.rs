use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::user::{Role, User};
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_catalogue_repo::PostgresCatalogueRepo,
    postgres_schedule_repo::PostgresScheduleRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_catalogue_repo::SqliteCatalogueRepo,
    sqlite_schedule_repo::SqliteScheduleRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(config, pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(config, pool)
    };

    if let Some(username) = &config.bootstrap_admin {
        ensure_admin(&state, username).await;
    }

    state
}

pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    AppState::from_repos(
        config.clone(),
        Arc::new(SqliteUserRepo::new(pool.clone())),
        Arc::new(SqliteCatalogueRepo::new(pool.clone())),
        Arc::new(SqliteScheduleRepo::new(pool.clone())),
        Arc::new(SqliteBookingRepo::new(pool)),
    )
}

pub fn postgres_state(config: &Config, pool: PgPool) -> AppState {
    AppState::from_repos(
        config.clone(),
        Arc::new(PostgresUserRepo::new(pool.clone())),
        Arc::new(PostgresCatalogueRepo::new(pool.clone())),
        Arc::new(PostgresScheduleRepo::new(pool.clone())),
        Arc::new(PostgresBookingRepo::new(pool)),
    )
}

async fn ensure_admin(state: &AppState, username: &str) {
    match state.user_repo.find_by_username(username).await {
        Ok(Some(user)) if user.role == Role::Admin => {}
        Ok(Some(user)) => warn!("Bootstrap admin '{}' exists with role {}", username, user.role),
        Ok(None) => match state.user_repo.create(&User::new(username.to_string(), Role::Admin)).await {
            Ok(admin) => info!("Created bootstrap admin '{}' with id {}", admin.username, admin.id),
            Err(e) => warn!("Failed to create bootstrap admin '{}': {:?}", username, e),
        },
        Err(e) => warn!("Failed to look up bootstrap admin '{}': {:?}", username, e),
    }
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
