// List loading for the friends, cards and transfers screens
pub mod compose;
pub mod config;
pub mod error;
pub mod format;
pub mod friends_cache;
pub mod loader;
pub mod models;
pub mod providers;
pub mod screen;
pub mod session;
pub mod source;

pub use compose::{compose, AppServices};
pub use config::Config;
pub use error::Error;
pub use friends_cache::{FriendsCache, NullFriendsCache, SqliteFriendsCache};
pub use loader::{
    ItemOrigin, ListSink, LoadOutcome, LoaderConfig, LoaderState, RetryPolicy, RetryingListLoader,
};
pub use models::{Action, DisplayItem, OnActivate, TransferStyle};
pub use screen::{ListScreen, ScreenConfig, ScreenKind};
pub use session::{StaticSession, UserSession};
pub use source::{ItemSource, SnapshotFallback};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
