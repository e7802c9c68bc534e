// Offline copy of the friends list
use std::sync::Arc;

use async_trait::async_trait;
use iacc_api::Friend;
use iacc_cache::CacheManager;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Key the friends snapshot is stored under
pub const FRIENDS_KEY: &str = "friends_list";

/// Snapshot store for friends
///
/// `save` is best-effort: a failed write is logged and otherwise ignored, the
/// caller never hears about it. `load` is only used as a fallback.
#[async_trait]
pub trait FriendsCache: Send + Sync {
    async fn save(&self, friends: &[Friend]);
    async fn load(&self) -> Result<Vec<Friend>>;
}

/// Friends snapshot kept in the SQLite cache
pub struct SqliteFriendsCache {
    store: Arc<CacheManager>,
}

impl SqliteFriendsCache {
    pub fn new(store: Arc<CacheManager>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FriendsCache for SqliteFriendsCache {
    async fn save(&self, friends: &[Friend]) {
        match self.store.set(FRIENDS_KEY, friends) {
            Ok(()) => debug!("Cached {} friends", friends.len()),
            Err(e) => warn!("Failed to cache friends: {}", e),
        }
    }

    async fn load(&self) -> Result<Vec<Friend>> {
        let friends: Vec<Friend> = self.store.get(FRIENDS_KEY)?;
        debug!("Loaded {} friends from cache", friends.len());
        Ok(friends)
    }
}

/// Stand-in for users who don't get an offline copy
pub struct NullFriendsCache;

#[async_trait]
impl FriendsCache for NullFriendsCache {
    async fn save(&self, _friends: &[Friend]) {}

    async fn load(&self) -> Result<Vec<Friend>> {
        Err(Error::CacheRead("offline copy is not enabled".into()))
    }
}
