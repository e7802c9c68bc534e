// Remote APIs for friends, cards and transfers
pub mod client;
pub mod models;
pub mod services;

// Re-export common types
pub use client::{ApiError, FinanceClient, Result};
pub use models::{Card, Friend, Transfer};
pub use services::{CardsApi, FriendsApi, TransfersApi};
