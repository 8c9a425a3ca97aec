use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub hold_ttl_minutes: i64,
    pub pending_ttl_hours: i64,
    pub lead_time_minutes: i64,
    pub slot_granularity_minutes: i64,
    pub reaper_interval_secs: u64,
    pub cancelled_retention_minutes: i64,
    pub resolver_mode: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "lessonbook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            hold_ttl_minutes: env::var("HOLD_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            pending_ttl_hours: env::var("PENDING_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(48),
            lead_time_minutes: env::var("LEAD_TIME_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(180),
            slot_granularity_minutes: env::var("SLOT_GRANULARITY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            reaper_interval_secs: env::var("REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            cancelled_retention_minutes: env::var("CANCELLED_RETENTION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            resolver_mode: env::var("RESOLVER_MODE")
                .unwrap_or_else(|_| "strict_overlap".to_string()),
        }
    }
}
