// ItemSource implementations, one per list screen
pub mod cards;
pub mod friends;
pub mod transfers;

pub use cards::CardSource;
pub use friends::{FriendSnapshotFallback, FriendSource};
pub use transfers::TransferSource;
