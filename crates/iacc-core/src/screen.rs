// List screens: what each one is configured with, and the state it shows
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use iacc_api::{Card, Friend, Transfer};
use tracing::debug;

use crate::{
    loader::{ItemOrigin, ListSink, RetryPolicy, RetryingListLoader},
    models::{DisplayItem, OnActivate},
    Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Friends,
    Cards,
    SentTransfers,
    ReceivedTransfers,
}

impl ScreenKind {
    pub fn title(self) -> &'static str {
        match self {
            ScreenKind::Friends => "Friends",
            ScreenKind::Cards => "Cards",
            ScreenKind::SentTransfers => "Sent",
            ScreenKind::ReceivedTransfers => "Received",
        }
    }

    /// Label of the screen's primary button
    pub fn action_label(self) -> &'static str {
        match self {
            ScreenKind::Friends => "Add friend",
            ScreenKind::Cards => "Add card",
            ScreenKind::SentTransfers => "Send money",
            ScreenKind::ReceivedTransfers => "Request money",
        }
    }

    pub fn default_retry(self) -> RetryPolicy {
        match self {
            ScreenKind::Friends => RetryPolicy::up_to(2),
            ScreenKind::Cards => RetryPolicy::disabled(),
            ScreenKind::SentTransfers | ScreenKind::ReceivedTransfers => RetryPolicy::up_to(1),
        }
    }
}

/// Everything a screen variant needs to be wired up
///
/// One variant per screen, so there is no way to ask for two list kinds at
/// once or for none at all.
pub enum ScreenConfig {
    Friends {
        retry: RetryPolicy,
        on_activate: OnActivate<Friend>,
    },
    Cards {
        retry: RetryPolicy,
        on_activate: OnActivate<Card>,
    },
    SentTransfers {
        retry: RetryPolicy,
        on_activate: OnActivate<Transfer>,
    },
    ReceivedTransfers {
        retry: RetryPolicy,
        on_activate: OnActivate<Transfer>,
    },
}

impl ScreenConfig {
    pub fn friends(on_activate: OnActivate<Friend>) -> Self {
        ScreenConfig::Friends {
            retry: ScreenKind::Friends.default_retry(),
            on_activate,
        }
    }

    pub fn cards(on_activate: OnActivate<Card>) -> Self {
        ScreenConfig::Cards {
            retry: ScreenKind::Cards.default_retry(),
            on_activate,
        }
    }

    pub fn sent_transfers(on_activate: OnActivate<Transfer>) -> Self {
        ScreenConfig::SentTransfers {
            retry: ScreenKind::SentTransfers.default_retry(),
            on_activate,
        }
    }

    pub fn received_transfers(on_activate: OnActivate<Transfer>) -> Self {
        ScreenConfig::ReceivedTransfers {
            retry: ScreenKind::ReceivedTransfers.default_retry(),
            on_activate,
        }
    }

    pub fn kind(&self) -> ScreenKind {
        match self {
            ScreenConfig::Friends { .. } => ScreenKind::Friends,
            ScreenConfig::Cards { .. } => ScreenKind::Cards,
            ScreenConfig::SentTransfers { .. } => ScreenKind::SentTransfers,
            ScreenConfig::ReceivedTransfers { .. } => ScreenKind::ReceivedTransfers,
        }
    }

    pub fn retry(&self) -> RetryPolicy {
        match self {
            ScreenConfig::Friends { retry, .. }
            | ScreenConfig::Cards { retry, .. }
            | ScreenConfig::SentTransfers { retry, .. }
            | ScreenConfig::ReceivedTransfers { retry, .. } => *retry,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        match &mut self {
            ScreenConfig::Friends { retry, .. }
            | ScreenConfig::Cards { retry, .. }
            | ScreenConfig::SentTransfers { retry, .. }
            | ScreenConfig::ReceivedTransfers { retry, .. } => *retry = policy,
        }
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A list screen's visible state plus the loader feeding it
///
/// `refresh` is single-flight: a trigger that arrives while a load is running
/// is dropped rather than queued.
pub struct ListScreen {
    kind: ScreenKind,
    rows: Mutex<Vec<DisplayItem>>,
    origin: Mutex<Option<ItemOrigin>>,
    last_error: Mutex<Option<String>>,
    loader: tokio::sync::Mutex<RetryingListLoader>,
}

impl ListScreen {
    pub fn new(kind: ScreenKind, mut loader: RetryingListLoader) -> Arc<Self> {
        Arc::new_cyclic(|screen: &Weak<ListScreen>| {
            let sink: Weak<dyn ListSink> = screen.clone();
            loader.attach(sink);
            Self {
                kind,
                rows: Mutex::new(Vec::new()),
                origin: Mutex::new(None),
                last_error: Mutex::new(None),
                loader: tokio::sync::Mutex::new(loader),
            }
        })
    }

    pub fn kind(&self) -> ScreenKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn rows(&self) -> Vec<DisplayItem> {
        lock(&self.rows).clone()
    }

    pub fn origin(&self) -> Option<ItemOrigin> {
        *lock(&self.origin)
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.try_lock().is_err()
    }

    /// Pull-to-refresh; returns false when a load was already running
    pub async fn refresh(&self) -> bool {
        let Ok(mut loader) = self.loader.try_lock() else {
            debug!("{} refresh ignored: already loading", self.title());
            return false;
        };

        loader.load().await;
        true
    }

    /// First appearance loads only if nothing is on screen yet
    pub async fn appear(&self) -> bool {
        let empty = lock(&self.rows).is_empty();
        if empty {
            self.refresh().await
        } else {
            false
        }
    }

    /// Activate row `index`; false if there is no such row
    pub fn select(&self, index: usize) -> bool {
        let item = lock(&self.rows).get(index).cloned();
        match item {
            Some(item) => {
                item.activate();
                true
            }
            None => false,
        }
    }
}

impl ListSink for ListScreen {
    fn show_items(&self, items: Vec<DisplayItem>, origin: ItemOrigin) {
        *lock(&self.rows) = items;
        *lock(&self.origin) = Some(origin);
        *lock(&self.last_error) = None;
    }

    fn show_error(&self, error: &Error) {
        *lock(&self.last_error) = Some(error.to_string());
    }
}
