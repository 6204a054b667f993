use std::sync::Arc;

use subscription_aggregator::api::routes::create_routes;
use subscription_aggregator::api::subscriptions::AppState;
use subscription_aggregator::config::{run_migrations, AppConfig, DatabaseConfig, StorageBackend};
use subscription_aggregator::repository::{
    InMemorySubscriptionRepository, PgSubscriptionRepository, SubscriptionRepository,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // RUST_LOG overrides LOG_LEVEL
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let repository: Arc<dyn SubscriptionRepository> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = db_config.create_pool().await?;
            info!("Connected to PostgreSQL");

            run_migrations(&pool).await?;
            info!("Database migrations applied");

            Arc::new(PgSubscriptionRepository::new(pool, config.list_order))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on exit");
            Arc::new(InMemorySubscriptionRepository::new(config.list_order))
        }
    };

    let app = create_routes(AppState::new(repository), config.request_timeout);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, list_order = %config.list_order, "Subscription aggregator listening");

    axum::serve(listener, app).await?;

    Ok(())
}
