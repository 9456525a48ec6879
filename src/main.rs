use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelmatch_api::{
    config::Config,
    db::{
        create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle,
        PgWatchStatusStore, RedisStore,
    },
    routes::{create_router, AppState},
    services::{
        providers::{CachedSearchIndex, ImdbProvider, TmdbProvider},
        JwtVerifier, TitleResolver,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelmatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (cache, cache_writer) = create_cache(&config)?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool).await?;

    let trending = TmdbProvider::new(
        cache.clone(),
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    );
    let imdb = Arc::new(ImdbProvider::new(
        cache.clone(),
        config.rapid_api_key.clone(),
        config.rapid_api_host.clone(),
        config.rapid_api_url.clone(),
    ));
    let search_index = CachedSearchIndex::new(imdb.clone(), cache.clone());

    let state = Arc::new(AppState {
        trending: Arc::new(trending),
        resolver: TitleResolver::new(
            Arc::new(search_index),
            Duration::from_millis(config.search_timeout_ms),
        ),
        titles: imdb,
        statuses: Arc::new(PgWatchStatusStore::new(pool)),
        verifier: Arc::new(JwtVerifier::from_rsa_pem(&config.clerk_jwt_key)?),
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, cache = cache.backend(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

/// Redis when configured, otherwise a process-local cache
fn create_cache(config: &Config) -> anyhow::Result<(Cache, Option<CacheWriterHandle>)> {
    match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (store, writer) = RedisStore::new(client);
            Ok((Cache::new(Arc::new(store)), Some(writer)))
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-memory cache");
            Ok((Cache::in_memory(), None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
