use std::fmt;
use std::sync::Arc;

use iacc_api::{Card, Friend, Transfer};

use crate::format::{format_amount, format_date, DateStyle};

/// Zero-argument action run when a row is activated
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// Navigation callback supplied by a screen, called with the tapped record
pub type OnActivate<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// One row of any list screen
///
/// Built fresh on every load from a domain record plus the screen's
/// navigation callback; never persisted.
#[derive(Clone)]
pub struct DisplayItem {
    pub title: String,
    pub subtitle: String,
    on_activate: Action,
}

impl fmt::Debug for DisplayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayItem")
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .finish_non_exhaustive()
    }
}

impl DisplayItem {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, on_activate: Action) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            on_activate,
        }
    }

    pub fn activate(&self) {
        (self.on_activate)()
    }

    pub fn from_friend(friend: &Friend, on_activate: &OnActivate<Friend>) -> Self {
        Self::new(&friend.name, &friend.phone, bind(friend, on_activate))
    }

    pub fn from_card(card: &Card, on_activate: &OnActivate<Card>) -> Self {
        Self::new(&card.number, &card.holder, bind(card, on_activate))
    }

    pub fn from_transfer(
        transfer: &Transfer,
        style: TransferStyle,
        on_activate: &OnActivate<Transfer>,
    ) -> Self {
        let amount = format_amount(transfer.amount, &transfer.currency_code);
        let title = format!("{} • {}", amount, transfer.description);

        let subtitle = match style {
            TransferStyle::Sent => format!(
                "Sent to: {} on {}",
                transfer.recipient,
                format_date(&transfer.date, DateStyle::Long)
            ),
            TransferStyle::Received => format!(
                "Received from: {} on {}",
                transfer.sender,
                format_date(&transfer.date, DateStyle::Short)
            ),
        };

        Self::new(title, subtitle, bind(transfer, on_activate))
    }
}

/// Which side of the transfer feed a row belongs to
///
/// Sent rows use the long date style, received rows the short one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStyle {
    Sent,
    Received,
}

impl TransferStyle {
    /// Keeps the transfers this side should show
    pub fn includes(self, transfer: &Transfer) -> bool {
        match self {
            TransferStyle::Sent => transfer.is_sender,
            TransferStyle::Received => !transfer.is_sender,
        }
    }
}

fn bind<T>(record: &T, on_activate: &OnActivate<T>) -> Action
where
    T: Clone + Send + Sync + 'static,
{
    let record = record.clone();
    let callback = Arc::clone(on_activate);
    Arc::new(move || callback(&record))
}
