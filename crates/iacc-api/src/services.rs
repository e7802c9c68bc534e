use async_trait::async_trait;

use crate::{
    models::{Card, Friend, Transfer},
    Result,
};

/// Loads every friend of the signed-in user
///
/// No paging: each call returns the whole current collection.
#[async_trait]
pub trait FriendsApi: Send + Sync {
    async fn load_friends(&self) -> Result<Vec<Friend>>;
}

#[async_trait]
pub trait CardsApi: Send + Sync {
    async fn load_cards(&self) -> Result<Vec<Card>>;
}

/// Loads the transfer feed, sent and received mixed together
#[async_trait]
pub trait TransfersApi: Send + Sync {
    async fn load_transfers(&self) -> Result<Vec<Transfer>>;
}
