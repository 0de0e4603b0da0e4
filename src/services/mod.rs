// Service exports
pub mod backend;
pub mod cache;
pub mod notifications;
pub mod postgres;
pub mod store;

pub use backend::{BackendError, LikeOutcome, MemoryBackend, PersistenceBackend, DISCOVERY_LIMIT};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use notifications::NotificationQueue;
pub use postgres::PostgresBackend;
pub use store::{AppStore, Command, Outcome, StoreError};
