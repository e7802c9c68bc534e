// Transfer lists - one feed, split into sent and received views
use std::sync::Arc;

use async_trait::async_trait;
use iacc_api::{Transfer, TransfersApi};

use crate::{
    models::{DisplayItem, OnActivate, TransferStyle},
    source::ItemSource,
    Result,
};

/// Sent or received half of the transfer feed
///
/// Filtering only drops records; the feed's order is kept.
pub struct TransferSource {
    api: Arc<dyn TransfersApi>,
    style: TransferStyle,
    on_activate: OnActivate<Transfer>,
}

impl TransferSource {
    pub fn new(
        api: Arc<dyn TransfersApi>,
        style: TransferStyle,
        on_activate: OnActivate<Transfer>,
    ) -> Self {
        Self {
            api,
            style,
            on_activate,
        }
    }

    pub fn sent(api: Arc<dyn TransfersApi>, on_activate: OnActivate<Transfer>) -> Self {
        Self::new(api, TransferStyle::Sent, on_activate)
    }

    pub fn received(api: Arc<dyn TransfersApi>, on_activate: OnActivate<Transfer>) -> Self {
        Self::new(api, TransferStyle::Received, on_activate)
    }
}

#[async_trait]
impl ItemSource for TransferSource {
    async fn load_items(&self) -> Result<Vec<DisplayItem>> {
        let transfers = self.api.load_transfers().await?;

        Ok(transfers
            .iter()
            .filter(|transfer| self.style.includes(transfer))
            .map(|transfer| DisplayItem::from_transfer(transfer, self.style, &self.on_activate))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockall::mock;
    use rust_decimal::Decimal;

    mock! {
        pub TransfersService {}

        #[async_trait]
        impl TransfersApi for TransfersService {
            async fn load_transfers(&self) -> iacc_api::Result<Vec<Transfer>>;
        }
    }

    fn transfer(description: &str, is_sender: bool) -> Transfer {
        Transfer {
            sender: "Ana".into(),
            recipient: "Bob".into(),
            amount: Decimal::new(1000, 2),
            currency_code: "USD".into(),
            description: description.into(),
            date: Utc.with_ymd_and_hms(2021, 6, 1, 9, 5, 0).unwrap(),
            is_sender,
        }
    }

    fn feed() -> Arc<dyn TransfersApi> {
        let mut api = MockTransfersService::new();
        api.expect_load_transfers().returning(|| {
            Ok(vec![
                transfer("one", true),
                transfer("two", false),
                transfer("three", true),
                transfer("four", false),
                transfer("five", true),
            ])
        });
        Arc::new(api)
    }

    fn noop() -> OnActivate<Transfer> {
        Arc::new(|_: &Transfer| {})
    }

    fn descriptions(items: &[DisplayItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.title.trim_start_matches("$10.00 • ").to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_sent_keeps_only_sent_in_order() {
        let items = TransferSource::sent(feed(), noop()).load_items().await.unwrap();

        assert_eq!(descriptions(&items), vec!["one", "three", "five"]);
        assert!(items[0].subtitle.starts_with("Sent to: Bob on June 1, 2021"));
    }

    #[tokio::test]
    async fn test_received_keeps_the_rest() {
        let items = TransferSource::received(feed(), noop())
            .load_items()
            .await
            .unwrap();

        assert_eq!(descriptions(&items), vec!["two", "four"]);
        assert_eq!(items[0].subtitle, "Received from: Ana on 6/1/21, 9:05 AM");
    }

    #[tokio::test]
    async fn test_activation_hands_back_the_transfer() {
        let picked = Arc::new(std::sync::Mutex::new(Vec::new()));
        let slot = picked.clone();
        let source = TransferSource::sent(
            feed(),
            Arc::new(move |t: &Transfer| slot.lock().unwrap().push(t.description.clone())),
        );

        let items = source.load_items().await.unwrap();
        items[1].activate();

        assert_eq!(*picked.lock().unwrap(), vec!["three".to_string()]);
    }
}
