// Friends list - bridges FriendsApi and the offline cache with ItemSource
use std::sync::Arc;

use async_trait::async_trait;
use iacc_api::{Friend, FriendsApi};

use crate::{
    friends_cache::FriendsCache,
    models::{DisplayItem, OnActivate},
    session::UserSession,
    source::{ItemSource, SnapshotFallback},
    Result,
};

/// Live friends list
///
/// Premium users get every successful fetch written to the cache before the
/// rows are built. The write is fire-and-forget.
pub struct FriendSource {
    api: Arc<dyn FriendsApi>,
    session: Arc<dyn UserSession>,
    cache: Arc<dyn FriendsCache>,
    on_activate: OnActivate<Friend>,
}

impl FriendSource {
    pub fn new(
        api: Arc<dyn FriendsApi>,
        session: Arc<dyn UserSession>,
        cache: Arc<dyn FriendsCache>,
        on_activate: OnActivate<Friend>,
    ) -> Self {
        Self {
            api,
            session,
            cache,
            on_activate,
        }
    }
}

#[async_trait]
impl ItemSource for FriendSource {
    async fn load_items(&self) -> Result<Vec<DisplayItem>> {
        let friends = self.api.load_friends().await?;

        if self.session.is_premium() {
            self.cache.save(&friends).await;
        }

        Ok(friends
            .iter()
            .map(|friend| DisplayItem::from_friend(friend, &self.on_activate))
            .collect())
    }
}

/// Cached friends, projected exactly like the live ones
pub struct FriendSnapshotFallback {
    cache: Arc<dyn FriendsCache>,
    on_activate: OnActivate<Friend>,
}

impl FriendSnapshotFallback {
    pub fn new(cache: Arc<dyn FriendsCache>, on_activate: OnActivate<Friend>) -> Self {
        Self { cache, on_activate }
    }
}

#[async_trait]
impl SnapshotFallback for FriendSnapshotFallback {
    async fn load_snapshot(&self) -> Result<Vec<DisplayItem>> {
        let friends = self.cache.load().await?;

        Ok(friends
            .iter()
            .map(|friend| DisplayItem::from_friend(friend, &self.on_activate))
            .collect())
    }
}
