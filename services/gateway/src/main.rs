use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gateway::{
    AppState,
    catalog::{CatalogClient, CatalogConfig},
    config::{ServerConfig, StoreBackend},
    jwt::{JwtConfig, JwtService},
    repositories::{InMemoryUserStore, UserRepository, UserStore},
    routes,
};

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting favorites gateway");

    let server_config = ServerConfig::from_env()?;

    let store: Arc<dyn UserStore> = match server_config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            Arc::new(UserRepository::new(pool))
        }
        StoreBackend::Memory => Arc::new(InMemoryUserStore::new()),
    };

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let catalog = CatalogClient::new(CatalogConfig::from_env()?)?;

    let app_state = AppState::new(store, jwt_service, catalog, server_config.cookie_secure);

    let app = routes::create_router(app_state);

    let address = server_config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Gateway listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
