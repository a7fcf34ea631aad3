use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &fleetdesk::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        db_host = %cfg.database.host,
        db_port = cfg.database.port,
        database = %cfg.database.database,
        db_user = %cfg.database.username,
        loglevel = %cfg.loglevel
    );

    let db = fleetdesk::db::Database::connect(&cfg.database);
    if let Err(e) = db.ping().await {
        error!(error = %e, "database is unreachable; refusing to start");
        return Err(e.into());
    }
    info!("database connection verified");

    let state = fleetdesk::router::FleetState::new(db.clone());
    state.store.bootstrap().await?;

    let app = fleetdesk::router::fleet_router(state);

    let addr = cfg.server.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
