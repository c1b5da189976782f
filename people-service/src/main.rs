use people_service::config::PeopleConfig;
use people_service::services::init_metrics;
use people_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("people-service", &log_level, otlp_endpoint.as_deref());

    let config = PeopleConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start people-service: {}", e);
        e
    })?;

    application.run_until_stopped().await?;

    Ok(())
}
