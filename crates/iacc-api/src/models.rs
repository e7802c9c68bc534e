use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A friend as returned by `GET /friends`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

impl Friend {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// A payment card as returned by `GET /cards`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub number: String,
    pub holder: String,
}

/// A money transfer as returned by `GET /transfers`
///
/// One feed carries both directions; `is_sender` tells whether the
/// current user sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub sender: String,
    pub recipient: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_sender: bool,
}
