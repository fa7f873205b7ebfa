use std::{sync::Arc, time::Duration};

use movie_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, MemorySessionStore, RedisSessionStore, SessionStore},
    services::{MovieCatalog, TmdbClient},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::new(
        config.tmdb_api_host.clone(),
        config.tmdb_api_version.clone(),
        config.tmdb_api_key.clone(),
    ));

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(redis_url) => {
            let cache = Cache::new(create_redis_client(redis_url)?);
            Arc::new(RedisSessionStore::new(cache, config.session_ttl))
        }
        None => Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.session_ttl,
        ))),
    };

    tracing::info!(
        catalog_host = %config.tmdb_api_host,
        sessions = sessions.name(),
        "Starting movie recommender"
    );

    let state = AppState::new(catalog, sessions, config.poster_base_url.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
