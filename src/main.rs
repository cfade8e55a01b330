use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use checkin_server::checkin::{CheckInEngine, ScheduleGuard, SystemClock};
use checkin_server::config::Config;
use checkin_server::database::{PgEventSchedule, PgRegistrationStore};
use checkin_server::routes::create_routes;
use checkin_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("checkin_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Migrations run successfully");

    let clock = Arc::new(SystemClock);
    let registrations = Arc::new(PgRegistrationStore::new(pool.clone()));
    let events = Arc::new(PgEventSchedule::new(pool));
    let guard = ScheduleGuard::new(events.clone(), clock.clone(), config.event_utc_offset);
    let engine = CheckInEngine::new(registrations.clone(), Arc::new(guard), clock);

    let state = AppState::new(engine, registrations, events, config.event_utc_offset);
    let app = create_routes(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Check-in server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
