mod config;
mod db;
mod errors;
mod models;
mod registrations;
mod routes;
mod schedules;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::registrations::postgres::PgRegistrationStore;
use crate::registrations::service::RegistrationService;
use crate::routes::build_router;
use crate::schedules::postgres::{PgScheduleCounterStore, PgScheduleStore};
use crate::schedules::service::ScheduleService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talentgate API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Wire the stores into the services
    let registration_store = Arc::new(PgRegistrationStore::new(db.clone()));
    let schedule_store = Arc::new(PgScheduleStore::new(db.clone()));
    let counter_store = Arc::new(PgScheduleCounterStore::new(db));

    let state = AppState {
        registrations: RegistrationService::new(
            registration_store,
            schedule_store.clone(),
            counter_store.clone(),
        ),
        schedules: ScheduleService::new(schedule_store, counter_store),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
