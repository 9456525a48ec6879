use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::db::cache::CacheStore;
use crate::error::AppResult;

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed [`CacheStore`]
///
/// Reads go straight to Redis; writes are queued to a background task so cache
/// population never delays an API response.
#[derive(Clone)]
pub struct RedisStore {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    writer: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task and waits until it has flushed
    /// all pending writes to Redis and exited.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");

        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Cache writer task did not exit cleanly");
        }
    }
}

impl RedisStore {
    /// Creates a new store and spawns its background writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let writer = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let store = Self {
            redis_client,
            write_tx,
        };

        (
            store,
            CacheWriterHandle {
                shutdown_tx,
                writer,
            },
        )
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown signal, drains whatever is still queued before exiting.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }

    fn set_raw_in_background(&self, key: String, value: String, ttl: u64) {
        let msg = CacheWriteMessage { key, value, ttl };
        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// These tests need a live Redis; they are skipped unless REDIS_URL is set.
#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> Option<String> {
        std::env::var("REDIS_URL").ok()
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not-a-url").is_err());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_writer_exit() {
        // nothing listens here, so every queued write fails fast
        let client = create_redis_client("redis://127.0.0.1:9").unwrap();
        let (store, handle) = RedisStore::new(client);

        for i in 0..5 {
            store.set_raw_in_background(format!("k{}", i), "1".to_string(), 60);
        }
        handle.shutdown().await;

        // the writer has exited and dropped its receiver
        store.set_raw_in_background("late".to_string(), "1".to_string(), 60);
        assert!(store.write_tx.is_closed());
    }

    #[tokio::test]
    async fn test_set_in_background_writes_to_redis() {
        let Some(url) = redis_url() else { return };

        let client = create_redis_client(&url).unwrap();
        let (store, _handle) = RedisStore::new(client.clone());

        store.set_raw_in_background("reelmatch_test_write".to_string(), "\"v\"".to_string(), 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved = store.get_raw("reelmatch_test_write").await.unwrap();
        assert_eq!(retrieved.as_deref(), Some("\"v\""));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del("reelmatch_test_write").await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_writer_graceful_shutdown() {
        let Some(url) = redis_url() else { return };

        let client = create_redis_client(&url).unwrap();
        let (store, handle) = RedisStore::new(client.clone());

        store.set_raw_in_background("reelmatch_test_shutdown".to_string(), "1".to_string(), 60);
        handle.shutdown().await;

        let retrieved = store.get_raw("reelmatch_test_shutdown").await.unwrap();
        assert_eq!(retrieved.as_deref(), Some("1"));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del("reelmatch_test_shutdown").await.unwrap();
    }
}
