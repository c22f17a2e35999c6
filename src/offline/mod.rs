//! Offline cache proxy (`fulcrum serve`)
//!
//! Keeps the web dashboard usable through short network drops: a versioned
//! on-disk cache filled at install time and on every successful GET, served
//! when the backend cannot be reached.

pub mod cache;
pub mod proxy;

pub use cache::{CacheStorage, CacheStore, CachedResponse};
pub use proxy::{router, run_offline_proxy, OfflineProxy, CACHE_HEADER};
