//! Wire types for the cafeteria REST API.

use chrono::{DateTime, Utc};
use ezfood_core::{ItemId, OrderId, Price, StudentId};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::inventory::InventoryRecord;

/// Response envelope of `GET /dashboard/api/public-items/`.
#[derive(Debug, Deserialize)]
pub struct PublicItemsResponse {
    pub items: Vec<InventoryRecord>,
}

/// Payload of `PUT /dashboard/api/items/{id}/update/`.
///
/// The server expects the whole record with the new quantity, not a
/// partial update.
#[derive(Debug, Clone, Serialize)]
pub struct ItemUpdate {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
}

/// Payload of `POST /shop/api/save-order/`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub order_id: OrderId,
    pub student_id: StudentId,
    pub items: Vec<OrderLine>,
}

/// A single line of an order submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// A submitted order, as mirrored from/to the server order log and the
/// local order-history file.
///
/// Immutable once created; history is kept newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub student_id: StudentId,
    #[serde(with = "order_date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Order {
    /// Total across all lines of the order.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Order dates travel as epoch milliseconds; older server builds sent
/// ISO 8601 strings, so both are accepted on the way in.
mod order_date {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(date.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Millis(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Millis(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| D::Error::custom("order date out of range")),
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(D::Error::custom),
        }
    }
}
