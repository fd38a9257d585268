use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    /// Units on hand across every variant.
    pub stock: i64,
}

impl Product {
    /// Value of the stock on hand at list price. Saturates instead of
    /// overflowing.
    pub fn stock_value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.stock))
    }
}

impl FromRaw for Product {
    fn from_raw(raw: &RawRecord) -> Self {
        // Stock is either reported directly or summed from the variants.
        let stock = match raw.field("variants") {
            Value::Array(variants) if raw.field("stock").is_null() => variants
                .iter()
                .filter_map(Value::as_object)
                .map(|variant| variant.count("stock"))
                .fold(0, i64::saturating_add),
            _ => raw.count("stock"),
        };
        Self {
            id: raw.id("id"),
            name: raw.text("name"),
            category: raw.text_any(&["category.name", "category"]),
            price: raw.number("price"),
            stock,
        }
    }
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.category.as_str()),
        ]
    }
}
