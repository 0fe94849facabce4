use cleanwave_frontend::config::get_configuration;
use cleanwave_frontend::services::{fixtures::FixtureCatalog, metrics::init_metrics};
use cleanwave_frontend::startup::build_router;
use cleanwave_frontend::AppState;
use dotenvy::dotenv;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let telemetry = &configuration.telemetry;
    init_tracing(
        &telemetry.service_name,
        &telemetry.log_level,
        telemetry.otlp_endpoint.as_deref(),
    );

    let metrics_handle = init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    let fixtures = FixtureCatalog::load(configuration.fixtures.path.as_deref()).map_err(|e| {
        tracing::error!("Failed to load fixtures: {}", e);
        anyhow::anyhow!("Fixture error: {}", e)
    })?;

    if configuration.session.demo_role_inference {
        info!("Demo role inference enabled: emails containing \"organizer\" sign in as organizers");
    }

    let state = AppState::new(&configuration, fixtures, metrics_handle);
    let app = build_router(state, &configuration);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting cleanwave-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
