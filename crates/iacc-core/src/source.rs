use crate::{models::DisplayItem, Result};

/// Produces the rows for one list screen
///
/// Each implementation adapts one domain API (plus any cache or filter it
/// needs) into display-ready items. The result comes back to whoever awaits
/// `load_items`, so the caller's task is where list state gets touched.
#[async_trait::async_trait]
pub trait ItemSource: Send + Sync {
    async fn load_items(&self) -> Result<Vec<DisplayItem>>;
}

/// Last-known rows to show when the live source keeps failing
///
/// Read at most once per load, after the retry budget is spent.
#[async_trait::async_trait]
pub trait SnapshotFallback: Send + Sync {
    async fn load_snapshot(&self) -> Result<Vec<DisplayItem>>;
}
