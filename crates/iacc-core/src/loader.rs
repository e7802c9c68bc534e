// Retry and offline-fallback policy for list screens
use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use crate::{
    models::DisplayItem,
    source::{ItemSource, SnapshotFallback},
    Error,
};

/// How many extra attempts a screen gets after its first failed load
///
/// Retries are immediate: no backoff, no jitter, no wall-clock cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
        }
    }

    pub fn up_to(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
        }
    }

    pub fn allows_retry(&self, retries_so_far: u32) -> bool {
        self.enabled && retries_so_far < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    pub retry: RetryPolicy,
    /// Allows the offline snapshot once retries run out
    pub cache_eligible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Retrying { attempt: u32 },
    FallingBack,
    Success,
    Failed,
}

/// Where delivered rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrigin {
    Live,
    Cache,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        items: Vec<DisplayItem>,
        origin: ItemOrigin,
    },
    Failed(Error),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Receives what a load produced
///
/// The loader only holds a weak reference, so a screen that went away simply
/// stops getting calls.
pub trait ListSink: Send + Sync {
    fn show_items(&self, items: Vec<DisplayItem>, origin: ItemOrigin);
    fn show_error(&self, error: &Error);
    fn state_changed(&self, _state: LoaderState) {}
}

/// Drives one ItemSource through retries and the optional offline fallback
///
/// One request is in flight at a time. `load` takes `&mut self`, so two loads
/// on the same loader can't overlap; callers that share a loader decide what
/// to do with a second trigger.
pub struct RetryingListLoader {
    source: Arc<dyn ItemSource>,
    fallback: Option<Arc<dyn SnapshotFallback>>,
    config: LoaderConfig,
    retry_count: u32,
    state: LoaderState,
    sink: Option<Weak<dyn ListSink>>,
}

impl RetryingListLoader {
    pub fn new(source: Arc<dyn ItemSource>, config: LoaderConfig) -> Self {
        Self {
            source,
            fallback: None,
            config,
            retry_count: 0,
            state: LoaderState::Idle,
            sink: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn SnapshotFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn attach(&mut self, sink: Weak<dyn ListSink>) {
        self.sink = Some(sink);
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Load until success, an exhausted budget, or the fallback's answer
    ///
    /// The outcome goes to the attached sink (if it's still alive) and is
    /// also returned. Afterwards the loader is `Idle` with a zero retry count.
    pub async fn load(&mut self) -> LoadOutcome {
        let outcome = self.run().await;
        self.deliver(&outcome);
        self.transition(LoaderState::Idle);
        outcome
    }

    async fn run(&mut self) -> LoadOutcome {
        let source = Arc::clone(&self.source);

        loop {
            self.transition(LoaderState::Loading);

            let error = match source.load_items().await {
                Ok(items) => {
                    self.retry_count = 0;
                    self.transition(LoaderState::Success);
                    info!("Loaded {} items", items.len());
                    return LoadOutcome::Loaded {
                        items,
                        origin: ItemOrigin::Live,
                    };
                }
                Err(error) => error,
            };

            if self.config.retry.allows_retry(self.retry_count) {
                self.retry_count += 1;
                warn!(
                    "Load failed (attempt {}/{}): {}. Retrying now",
                    self.retry_count,
                    self.config.retry.max_retries.saturating_add(1),
                    error
                );
                self.transition(LoaderState::Retrying {
                    attempt: self.retry_count,
                });
                continue;
            }

            self.retry_count = 0;
            return self.fall_back(error).await;
        }
    }

    async fn fall_back(&mut self, error: Error) -> LoadOutcome {
        let fallback = if self.config.cache_eligible {
            self.fallback.clone()
        } else {
            None
        };

        let Some(fallback) = fallback else {
            warn!("Load failed: {}", error);
            self.transition(LoaderState::Failed);
            return LoadOutcome::Failed(error);
        };

        info!("Retries exhausted ({}); trying offline copy", error);
        self.transition(LoaderState::FallingBack);

        match fallback.load_snapshot().await {
            Ok(items) => {
                self.transition(LoaderState::Success);
                info!("Showing {} cached items", items.len());
                LoadOutcome::Loaded {
                    items,
                    origin: ItemOrigin::Cache,
                }
            }
            Err(cache_error) => {
                // Only the cache error reaches the screen
                warn!(
                    "Offline copy unavailable: {} (dropping transport error: {})",
                    cache_error, error
                );
                self.transition(LoaderState::Failed);
                LoadOutcome::Failed(cache_error)
            }
        }
    }

    fn live_sink(&self) -> Option<Arc<dyn ListSink>> {
        self.sink.as_ref().and_then(|sink| sink.upgrade())
    }

    fn transition(&mut self, state: LoaderState) {
        debug!("Loader {:?} -> {:?}", self.state, state);
        self.state = state;
        if let Some(sink) = self.live_sink() {
            sink.state_changed(state);
        }
    }

    fn deliver(&self, outcome: &LoadOutcome) {
        let Some(sink) = self.live_sink() else {
            if self.sink.is_some() {
                debug!("List screen is gone; dropping load result");
            }
            return;
        };

        match outcome {
            LoadOutcome::Loaded { items, origin } => sink.show_items(items.clone(), *origin),
            LoadOutcome::Failed(error) => sink.show_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        friends_cache::{FriendsCache, SqliteFriendsCache},
        models::OnActivate,
        providers::FriendSnapshotFallback,
        Result,
    };
    use async_trait::async_trait;
    use iacc_api::Friend;
    use iacc_cache::CacheManager;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` calls, then succeeds with one row
    struct ScriptedSource {
        calls: AtomicU32,
        failures: u32,
    }

    impl ScriptedSource {
        fn failing_first(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                failures,
            })
        }

        fn always_failing() -> Arc<Self> {
            Self::failing_first(u32::MAX)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemSource for ScriptedSource {
        async fn load_items(&self) -> Result<Vec<DisplayItem>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(Error::Transport("offline".into()))
            } else {
                Ok(vec![DisplayItem::new("live", "row", Arc::new(|| {}))])
            }
        }
    }

    struct CountingFallback {
        reads: AtomicU32,
    }

    #[async_trait]
    impl SnapshotFallback for CountingFallback {
        async fn load_snapshot(&self) -> Result<Vec<DisplayItem>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<Vec<LoaderState>>,
        items: Mutex<Option<(Vec<String>, ItemOrigin)>>,
        errors: Mutex<Vec<String>>,
    }

    impl ListSink for RecordingSink {
        fn show_items(&self, items: Vec<DisplayItem>, origin: ItemOrigin) {
            let titles = items.into_iter().map(|i| i.title).collect();
            *self.items.lock().unwrap() = Some((titles, origin));
        }

        fn show_error(&self, error: &Error) {
            self.errors.lock().unwrap().push(error.to_string());
        }

        fn state_changed(&self, state: LoaderState) {
            self.states.lock().unwrap().push(state);
        }
    }

    fn loader(source: Arc<ScriptedSource>, retry: RetryPolicy, cache_eligible: bool) -> RetryingListLoader {
        RetryingListLoader::new(
            source,
            LoaderConfig {
                retry,
                cache_eligible,
            },
        )
    }

    async fn friends_fallback(friends: Option<Vec<Friend>>) -> Arc<dyn SnapshotFallback> {
        let cache = Arc::new(SqliteFriendsCache::new(Arc::new(
            CacheManager::in_memory().unwrap(),
        )));
        if let Some(friends) = friends {
            cache.save(&friends).await;
        }
        let noop: OnActivate<Friend> = Arc::new(|_: &Friend| {});
        Arc::new(FriendSnapshotFallback::new(cache, noop))
    }

    #[tokio::test]
    async fn test_always_failing_source_called_budget_plus_one() {
        for max_retries in 0..=4 {
            let source = ScriptedSource::always_failing();
            let mut loader = loader(source.clone(), RetryPolicy::up_to(max_retries), false);

            let outcome = loader.load().await;

            assert!(matches!(outcome, LoadOutcome::Failed(Error::Transport(_))));
            assert_eq!(source.calls(), max_retries + 1);
            assert_eq!(loader.retry_count(), 0);
            assert_eq!(loader.state(), LoaderState::Idle);
        }
    }

    #[tokio::test]
    async fn test_recovers_after_k_failures() {
        let max_retries = 3;
        for failures in 0..=max_retries {
            let source = ScriptedSource::failing_first(failures);
            let mut loader = loader(source.clone(), RetryPolicy::up_to(max_retries), false);

            let outcome = loader.load().await;

            assert!(outcome.is_loaded());
            assert_eq!(source.calls(), failures + 1);
            assert_eq!(loader.retry_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_disabled_retry_calls_once() {
        let source = ScriptedSource::always_failing();
        let mut loader = loader(
            source.clone(),
            RetryPolicy {
                enabled: false,
                max_retries: 5,
            },
            false,
        );

        loader.load().await;

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_matches_disabled() {
        let source = ScriptedSource::always_failing();
        let mut loader = loader(source.clone(), RetryPolicy::up_to(0), false);

        loader.load().await;

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back_to_cached_friends() {
        let source = ScriptedSource::always_failing();
        let fallback =
            friends_fallback(Some(vec![Friend::new("Ana", "555"), Friend::new("Bob", "777")])).await;
        let mut loader = loader(source.clone(), RetryPolicy::up_to(2), true).with_fallback(fallback);

        let outcome = loader.load().await;

        assert_eq!(source.calls(), 3);
        match outcome {
            LoadOutcome::Loaded { items, origin } => {
                assert_eq!(origin, ItemOrigin::Cache);
                let rows: Vec<_> = items
                    .iter()
                    .map(|i| (i.title.as_str(), i.subtitle.as_str()))
                    .collect();
                assert_eq!(rows, vec![("Ana", "555"), ("Bob", "777")]);
            }
            LoadOutcome::Failed(e) => panic!("expected cached rows, got {}", e),
        }
    }

    #[tokio::test]
    async fn test_failed_cache_read_reports_cache_error() {
        let source = ScriptedSource::always_failing();
        let fallback = friends_fallback(None).await;
        let mut loader = loader(source, RetryPolicy::up_to(1), true).with_fallback(fallback);

        let outcome = loader.load().await;

        assert!(matches!(outcome, LoadOutcome::Failed(Error::CacheRead(_))));
    }

    #[tokio::test]
    async fn test_not_eligible_never_reads_cache() {
        let source = ScriptedSource::always_failing();
        let fallback = Arc::new(CountingFallback {
            reads: AtomicU32::new(0),
        });
        let mut loader =
            loader(source, RetryPolicy::up_to(1), false).with_fallback(fallback.clone());

        let outcome = loader.load().await;

        assert!(matches!(outcome, LoadOutcome::Failed(Error::Transport(_))));
        assert_eq!(fallback.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_eligible_without_fallback_fails_with_transport() {
        let source = ScriptedSource::always_failing();
        let mut loader = loader(source, RetryPolicy::up_to(1), true);

        let outcome = loader.load().await;

        assert!(matches!(outcome, LoadOutcome::Failed(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_fallback_read_once_per_load() {
        let source = ScriptedSource::always_failing();
        let fallback = Arc::new(CountingFallback {
            reads: AtomicU32::new(0),
        });
        let mut loader = loader(source.clone(), RetryPolicy::up_to(2), true)
            .with_fallback(fallback.clone());

        loader.load().await;
        loader.load().await;

        assert_eq!(fallback.reads.load(Ordering::SeqCst), 2);
        assert_eq!(source.calls(), 6);
    }

    #[tokio::test]
    async fn test_sink_sees_every_transition_and_the_rows() {
        let source = ScriptedSource::failing_first(1);
        let sink = Arc::new(RecordingSink::default());
        let mut loader = loader(source, RetryPolicy::up_to(2), false);
        let weak: Weak<dyn ListSink> = Arc::downgrade(&sink) as Weak<dyn ListSink>;
        loader.attach(weak);

        loader.load().await;

        assert_eq!(
            *sink.states.lock().unwrap(),
            vec![
                LoaderState::Loading,
                LoaderState::Retrying { attempt: 1 },
                LoaderState::Loading,
                LoaderState::Success,
                LoaderState::Idle,
            ]
        );
        assert_eq!(
            *sink.items.lock().unwrap(),
            Some((vec!["live".to_string()], ItemOrigin::Live))
        );
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    fn attached(loader: &mut RetryingListLoader) -> Arc<RecordingSink> {
        let sink = Arc::new(RecordingSink::default());
        loader.attach(Arc::downgrade(&sink) as Weak<dyn ListSink>);
        sink
    }

    #[tokio::test]
    async fn test_sink_sees_fallback_to_cached_rows() {
        let fallback = friends_fallback(Some(vec![Friend::new("Ana", "555")])).await;
        let mut loader =
            loader(ScriptedSource::always_failing(), RetryPolicy::up_to(1), true).with_fallback(fallback);
        let sink = attached(&mut loader);

        loader.load().await;

        assert_eq!(
            *sink.states.lock().unwrap(),
            vec![
                LoaderState::Loading,
                LoaderState::Retrying { attempt: 1 },
                LoaderState::Loading,
                LoaderState::FallingBack,
                LoaderState::Success,
                LoaderState::Idle,
            ]
        );
        assert_eq!(
            *sink.items.lock().unwrap(),
            Some((vec!["Ana".to_string()], ItemOrigin::Cache))
        );
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_sees_failed_fallback() {
        let fallback = friends_fallback(None).await;
        let mut loader =
            loader(ScriptedSource::always_failing(), RetryPolicy::up_to(1), true).with_fallback(fallback);
        let sink = attached(&mut loader);

        loader.load().await;

        assert_eq!(
            *sink.states.lock().unwrap(),
            vec![
                LoaderState::Loading,
                LoaderState::Retrying { attempt: 1 },
                LoaderState::Loading,
                LoaderState::FallingBack,
                LoaderState::Failed,
                LoaderState::Idle,
            ]
        );
        assert!(sink.items.lock().unwrap().is_none());
        let errors = sink.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("No offline copy available"), "{}", errors[0]);
    }

    #[tokio::test]
    async fn test_unbounded_budget_does_not_overflow() {
        let source = ScriptedSource::failing_first(2);
        let mut loader = loader(source.clone(), RetryPolicy::up_to(u32::MAX), false);
        // warn! fields are only formatted when a subscriber is listening
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let outcome = loader.load().await;

        assert!(outcome.is_loaded());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_sink_gets_terminal_error() {
        let source = ScriptedSource::always_failing();
        let sink = Arc::new(RecordingSink::default());
        let mut loader = loader(source, RetryPolicy::disabled(), false);
        loader.attach(Arc::downgrade(&sink) as Weak<dyn ListSink>);

        loader.load().await;

        assert_eq!(
            *sink.errors.lock().unwrap(),
            vec!["Could not reach the server: offline".to_string()]
        );
        assert!(sink.items.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_sink_still_finishes_the_load() {
        let source = ScriptedSource::failing_first(1);
        let sink = Arc::new(RecordingSink::default());
        let mut loader = loader(source.clone(), RetryPolicy::up_to(1), false);
        loader.attach(Arc::downgrade(&sink) as Weak<dyn ListSink>);
        drop(sink);

        let outcome = loader.load().await;

        assert!(outcome.is_loaded());
        assert_eq!(source.calls(), 2);
    }
}
