#![allow(dead_code)]

use salon_booking::{
    api::router::create_router,
    config::Config,
    domain::{
        models::{
            catalogue::{NewServiceParams, Service, ServiceCategory},
            schedule::{SpecialHours, WorkingHours},
            user::{Role, User},
        },
        services::availability::{weekday_index, ConflictPolicy},
    },
    infra::factory::sqlite_state,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::str::FromStr;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(ConflictPolicy::Overlap).await
    }

    pub async fn with_policy(conflict_policy: ConflictPolicy) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            timezone: chrono_tz::UTC,
            conflict_policy,
            log_dir: "./logs".to_string(),
            bootstrap_admin: None,
        };

        let state = Arc::new(sqlite_state(&config, pool.clone()));
        let router = create_router(state.clone());

        Self { router, pool, db_filename, state }
    }

    /// Sends a request as `user_id` (if any) and returns status and JSON body.
    pub async fn request(&self, method: &str, uri: &str, user_id: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user_id {
            builder = builder.header("X-User-Id", id);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user_id: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, user_id, None).await
    }

    pub async fn post(&self, uri: &str, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(user_id), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user_id: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(user_id), Some(body)).await
    }

    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        let mut user = User::new(username.to_string(), role);
        user.first_name = username.to_string();
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn seed_category(&self, name: &str) -> ServiceCategory {
        self.state.catalogue_repo.create_category(&ServiceCategory::new(name.to_string())).await.unwrap()
    }

    pub async fn seed_service(&self, category: &ServiceCategory, name: &str, duration_minutes: i32) -> Service {
        let service = Service::new(NewServiceParams {
            category_id: category.id.clone(),
            name: name.to_string(),
            description: String::new(),
            duration_minutes,
            price_cents: 2500,
        });
        self.state.catalogue_repo.create_service(&service).await.unwrap()
    }

    pub async fn seed_working_hours(&self, staff: &User, date: NaiveDate, start: &str, end: &str) -> WorkingHours {
        let hours = WorkingHours::new(staff.id.clone(), weekday_index(date), t(start), t(end));
        self.state.schedule_repo.upsert_working_hours(&hours).await.unwrap()
    }

    pub async fn seed_day_off(&self, staff: &User, date: NaiveDate) -> SpecialHours {
        self.state.schedule_repo.upsert_special_hours(&SpecialHours::day_off(staff.id.clone(), date)).await.unwrap()
    }

    pub async fn seed_special_hours(&self, staff: &User, date: NaiveDate, start: &str, end: &str) -> SpecialHours {
        let hours = SpecialHours::window(staff.id.clone(), date, t(start), t(end));
        self.state.schedule_repo.upsert_special_hours(&hours).await.unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// A week from today, so no booking rule about "today" or the past applies.
pub fn future_date() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(7)
}

pub fn t(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
}

/// Staff, client, admin and a 60-minute service, with the staff member
/// working 09:00-18:00 on `future_date()`'s weekday.
pub struct Salon {
    pub admin: User,
    pub client: User,
    pub staff: User,
    pub category: ServiceCategory,
    pub service: Service,
    pub date: NaiveDate,
}

pub async fn seed_salon(app: &TestApp) -> Salon {
    let admin = app.seed_user("admin", Role::Admin).await;
    let client = app.seed_user("client", Role::Client).await;
    let staff = app.seed_user("stylist", Role::Staff).await;
    let category = app.seed_category("Hair").await;
    let service = app.seed_service(&category, "Haircut", 60).await;
    let date = future_date();
    app.seed_working_hours(&staff, date, "09:00", "18:00").await;
    Salon { admin, client, staff, category, service, date }
}
