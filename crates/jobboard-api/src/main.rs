//! Job board API server

use anyhow::Context;
use jobboard_api::{create_router, state::AppState};
use jobboard_core::config::{AppConfig, LoggingConfig};
use jobboard_core::{JobRepository, MemoryStore, PgStore, UserRepository};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "jobboard_api={level},jobboard_core={level},audit=info,tower_http=info",
            level = logging.level
        ))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn open_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn JobRepository>)> {
    if config.database.is_in_memory() {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        let store = Arc::new(MemoryStore::new());
        let users: Arc<dyn UserRepository> = store.clone();
        let jobs: Arc<dyn JobRepository> = store;
        return Ok((users, jobs));
    }

    let store = PgStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("connecting to PostgreSQL")?;
    store.migrate().await.context("applying migrations")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to PostgreSQL"
    );

    let store = Arc::new(store);
    let users: Arc<dyn UserRepository> = store.clone();
    let jobs: Arc<dyn JobRepository> = store;
    Ok((users, jobs))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.logging);

    config.validate().context("invalid configuration")?;
    if config.auth.uses_development_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development signing secret");
    }

    let (users, jobs) = open_store(&config).await?;

    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, users, jobs).context("building token issuer")?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Job board API listening on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
