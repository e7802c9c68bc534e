// Composition root: turns a ScreenConfig into a live ListScreen
use std::sync::Arc;

use iacc_api::{CardsApi, FriendsApi, TransfersApi};
use tracing::debug;

use crate::{
    friends_cache::{FriendsCache, NullFriendsCache},
    loader::{LoaderConfig, RetryingListLoader},
    providers::{CardSource, FriendSnapshotFallback, FriendSource, TransferSource},
    screen::{ListScreen, ScreenConfig},
    session::UserSession,
    source::{ItemSource, SnapshotFallback},
};

/// Shared dependencies handed to every screen
#[derive(Clone)]
pub struct AppServices {
    pub friends: Arc<dyn FriendsApi>,
    pub cards: Arc<dyn CardsApi>,
    pub transfers: Arc<dyn TransfersApi>,
    pub session: Arc<dyn UserSession>,
    /// `None` when no offline store could be opened or it is switched off
    pub friends_cache: Option<Arc<dyn FriendsCache>>,
}

/// Wire the source, fallback and loader for one screen
///
/// Only a premium user's friends screen with a configured cache gets the
/// offline fallback; every other friends screen runs on `NullFriendsCache`
/// and fails with the transport error once retries run out.
pub fn compose(config: ScreenConfig, services: &AppServices) -> Arc<ListScreen> {
    let kind = config.kind();
    let retry = config.retry();

    let (source, fallback): (Arc<dyn ItemSource>, Option<Arc<dyn SnapshotFallback>>) = match config
    {
        ScreenConfig::Friends { on_activate, .. } => {
            let offline_cache = services
                .friends_cache
                .as_ref()
                .filter(|_| services.session.is_premium())
                .map(Arc::clone);
            let cache_eligible = offline_cache.is_some();
            let cache: Arc<dyn FriendsCache> =
                offline_cache.unwrap_or_else(|| Arc::new(NullFriendsCache));

            let source = FriendSource::new(
                Arc::clone(&services.friends),
                Arc::clone(&services.session),
                Arc::clone(&cache),
                Arc::clone(&on_activate),
            );
            let fallback = cache_eligible.then(|| {
                Arc::new(FriendSnapshotFallback::new(cache, on_activate)) as Arc<dyn SnapshotFallback>
            });

            (Arc::new(source) as Arc<dyn ItemSource>, fallback)
        }
        ScreenConfig::Cards { on_activate, .. } => {
            let source = CardSource::new(Arc::clone(&services.cards), on_activate);
            (Arc::new(source) as Arc<dyn ItemSource>, None)
        }
        ScreenConfig::SentTransfers { on_activate, .. } => {
            let source = TransferSource::sent(Arc::clone(&services.transfers), on_activate);
            (Arc::new(source) as Arc<dyn ItemSource>, None)
        }
        ScreenConfig::ReceivedTransfers { on_activate, .. } => {
            let source = TransferSource::received(Arc::clone(&services.transfers), on_activate);
            (Arc::new(source) as Arc<dyn ItemSource>, None)
        }
    };

    let config = LoaderConfig {
        retry,
        cache_eligible: fallback.is_some(),
    };
    debug!("Composing {} screen with {:?}", kind.title(), config);

    let mut loader = RetryingListLoader::new(source, config);
    if let Some(fallback) = fallback {
        loader = loader.with_fallback(fallback);
    }

    ListScreen::new(kind, loader)
}
