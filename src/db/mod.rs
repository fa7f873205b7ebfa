pub mod redis;
pub mod session;

pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use session::{MemorySessionStore, RedisSessionStore, Session, SessionId, SessionStore};
