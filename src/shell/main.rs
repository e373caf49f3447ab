use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use products::modules::products::adapters::outbound::bus_event_publisher::BusProductEventPublisher;
use products::modules::products::adapters::outbound::postgres_product_repository::PostgresProductRepository;
use products::modules::products::use_cases::process_outbox::registry::product_event_registry;
use products::modules::products::use_cases::process_outbox::sweeper::OutboxSweeper;
use products::shared::infrastructure::auth_token::token_manager::TokenManager;
use products::shared::infrastructure::database::connection_factory::PgConnectionFactory;
use products::shared::infrastructure::event_bus::pulsar::PulsarEventBus;
use products::shell::config::Config;
use products::shell::workers::{run_sweeper, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;

    let token_manager = Arc::new(TokenManager::with_refresh_buffer(
        config.database.token_issuer()?,
        config.database.refresh_buffer,
    ));
    let connections = PgConnectionFactory::new(
        token_manager,
        config.database.connection.clone(),
        config.database.pool.clone(),
    );
    let repository = Arc::new(PostgresProductRepository::connect(connections).await?);

    let bus = Arc::new(PulsarEventBus::new(
        config.bus.producer_name.clone(),
        config.bus.broker_url.clone(),
        config.bus.tenant.clone(),
        config.bus.namespace.clone(),
    ));
    let publisher = Arc::new(BusProductEventPublisher::new(
        bus,
        &config.bus.source_env,
        config.bus.topics.clone(),
    ));

    let sweeper = OutboxSweeper::new(repository, publisher, product_event_registry());

    tracing::info!(
        db_host = %config.database.connection.host,
        broker = %config.bus.broker_url,
        interval_secs = config.sweep.interval.as_secs(),
        "products outbox worker started"
    );
    let stats = run_sweeper(&sweeper, config.sweep, shutdown_signal()).await;
    tracing::info!(
        runs = stats.runs,
        published = stats.published,
        failed_runs = stats.failed_runs,
        timed_out_runs = stats.timed_out_runs,
        "products outbox worker stopped"
    );
    Ok(())
}
