// SQLite-backed snapshot store
// Keeps the last good copy of a list around for offline fallback

pub mod cache;

pub use cache::{CacheError, CacheManager};
