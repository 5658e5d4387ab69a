pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::MemoryStore;
pub use pg_store::PgStore;
pub use postgres::{create_pool, run_migrations};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{
    EpisodeStore, FollowStore, FriendshipStore, MovieStore, NotificationStore, ProfileStore,
    ProviderStore, RatingStore, Store, WatchlistStore,
};
