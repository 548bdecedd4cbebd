mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use campus_advisor::Advisor;
use campus_api::router::router;
use campus_api::state::{AppStateInner, AuthConfig};
use campus_db::Database;
use campus_notify::dispatcher::Notifier;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campusupport=debug,campus_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Opening the database also runs migrations and the reference-data seed.
    let db = Database::open(&config.db_path)?;

    let state = Arc::new(AppStateInner {
        db,
        auth: AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_minutes: config.token_ttl_minutes,
        },
        advisor: Advisor::new(config.advisor.clone()),
        notifier: Notifier::from_config(config.notify.clone()),
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("CampuSupport server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
