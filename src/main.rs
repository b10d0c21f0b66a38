use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use content_dashboard::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, FileStore, PreferencesStore, RedisStore},
    services::{
        providers::{MockSocialProvider, NewsApiProvider, OmdbProvider, Sources},
        DashboardOptions,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("content_dashboard=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let redis_client = config
        .redis_url
        .as_deref()
        .map(create_redis_client)
        .transpose()
        .context("Invalid REDIS_URL")?;

    let (cache, cache_writer) = match &redis_client {
        Some(client) => {
            let (cache, writer) = Cache::new(client.clone()).await;
            (Some(cache), Some(writer))
        }
        None => {
            tracing::info!("No Redis configured, upstream responses are not cached");
            (None, None)
        }
    };

    let store: Arc<dyn PreferencesStore> = match redis_client {
        Some(client) => Arc::new(RedisStore::new(client)),
        None => Arc::new(FileStore::new(&config.preferences_path)),
    };

    let sources = Sources::new(
        Arc::new(NewsApiProvider::new(
            config.news_api_key.clone(),
            config.news_api_url.clone(),
            config.upstream_timeout(),
            cache.clone(),
        )?),
        Arc::new(OmdbProvider::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
            config.upstream_timeout(),
            cache,
        )?),
        Arc::new(MockSocialProvider::new()),
    );

    let options = DashboardOptions {
        search_debounce: config.search_debounce(),
        refresh_debounce: config.refresh_debounce(),
        default_page_size: config.default_page_size,
    };
    let (state, preferences_writer) = AppState::build(sources, store, options).await;

    // First fill of the dashboard
    let outcome = state.dashboard.refresh().await;
    tracing::info!(outcome = ?outcome, "Initial content loaded");

    let app = create_router(state).layer(CorsLayer::permissive());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    preferences_writer.shutdown().await;
    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
