use std::sync::Arc;

use campus_advisor::Advisor;
use campus_db::Database;
use campus_notify::dispatcher::Notifier;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub auth: AuthConfig,
    pub advisor: Advisor,
    pub notifier: Notifier,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl_minutes: 30,
        }
    }
}
