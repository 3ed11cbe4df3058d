use crate::domain::services::availability::ConflictPolicy;
use chrono_tz::Tz;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz, // "today" and "now" for booking validation
    pub conflict_policy: ConflictPolicy,
    pub log_dir: String,
    pub bootstrap_admin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            timezone: env::var("SALON_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()).parse()
                .expect("SALON_TIMEZONE must be an IANA timezone name"),
            conflict_policy: env::var("CONFLICT_POLICY").unwrap_or_else(|_| "overlap".to_string()).parse()
                .expect("CONFLICT_POLICY must be 'overlap' or 'start_within'"),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
            bootstrap_admin: env::var("BOOTSTRAP_ADMIN").ok().filter(|s| !s.is_empty()),
        }
    }
}
