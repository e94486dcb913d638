use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use order_service::api;
use order_service::config::{Config, LogFormat, StoreBackend};
use order_service::distance::{DistanceProvider, GoogleDistanceMatrix, StraightLineDistance};
use order_service::error::AppError;
use order_service::state::AppState;
use order_service::store::{MemoryOrderStore, OrderStore, PgOrderStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::load()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let store: Arc<dyn OrderStore> = match config.store {
        StoreBackend::Postgres => {
            let store = PgOrderStore::connect(&config.db).await?;
            store.migrate().await?;
            tracing::info!(
                host = %config.db.hostname,
                schema = %config.db.schema,
                "connected to postgres"
            );
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory order store; orders are lost on restart");
            Arc::new(MemoryOrderStore::new())
        }
    };

    let distance: Arc<dyn DistanceProvider> = if config.map.api_key.is_empty() {
        tracing::warn!("MAP_API_KEY not set; falling back to straight-line distances");
        Arc::new(StraightLineDistance)
    } else {
        Arc::new(GoogleDistanceMatrix::new(
            &config.map.api_url,
            &config.map.api_key,
        ))
    };

    let shared_state = Arc::new(AppState::new(store, distance));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
