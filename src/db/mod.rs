pub mod memory;
pub mod postgres;
pub mod redis;
pub mod repository;

pub use memory::{MemorySessionStore, MemoryStore};
pub use postgres::{create_pool, run_migrations, PgStore};
pub use self::redis::{create_redis_client, RedisSessionStore};
pub use repository::{
    MovieRepository, ReviewRepository, SessionStore, UserRepository, WatchlistRepository,
};
