// Cards list - bridges CardsApi with ItemSource
use std::sync::Arc;

use async_trait::async_trait;
use iacc_api::{Card, CardsApi};

use crate::{
    models::{DisplayItem, OnActivate},
    source::ItemSource,
    Result,
};

pub struct CardSource {
    api: Arc<dyn CardsApi>,
    on_activate: OnActivate<Card>,
}

impl CardSource {
    pub fn new(api: Arc<dyn CardsApi>, on_activate: OnActivate<Card>) -> Self {
        Self { api, on_activate }
    }
}

#[async_trait]
impl ItemSource for CardSource {
    async fn load_items(&self) -> Result<Vec<DisplayItem>> {
        let cards = self.api.load_cards().await?;

        Ok(cards
            .iter()
            .map(|card| DisplayItem::from_card(card, &self.on_activate))
            .collect())
    }
}
