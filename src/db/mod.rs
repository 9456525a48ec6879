pub mod cache;
pub mod postgres;
pub mod redis;
pub mod watch_status;

mod macros;

pub use cache::{Cache, CacheKey, CacheStore, MemoryStore};
pub use postgres::{create_pool, run_migrations};
pub use redis::{create_redis_client, CacheWriterHandle, RedisStore};
pub use watch_status::{PgWatchStatusStore, WatchStatusStore};
