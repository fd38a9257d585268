use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::date_search_fields;
use crate::collection::Searchable;
use crate::line_items::{SoldQuantities, VariantRef};
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: RecordId,
    pub client_name: String,
    pub date: Option<NaiveDate>,
    pub total: Decimal,
    pub status: String,
    pub lines: Vec<SaleLine>,
}

/// One variant sold on a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub variant_ref: VariantRef,
    pub quantity: i64,
}

impl Sale {
    /// The ceiling for returns taken against this sale.
    pub fn sold_quantities(&self) -> SoldQuantities {
        SoldQuantities::new(
            self.id,
            self.lines
                .iter()
                .map(|line| (line.variant_ref.clone(), line.quantity)),
        )
    }
}

impl FromRaw for SaleLine {
    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            variant_ref: raw.text_any(&["variant_ref", "variant.id", "variant_id"]),
            quantity: raw.count("quantity"),
        }
    }
}

impl FromRaw for Sale {
    fn from_raw(raw: &RawRecord) -> Self {
        // Detail rows come as `items` or, from older endpoints, `details`.
        let lines = match (raw.field("items"), raw.field("details")) {
            (Value::Array(rows), _) | (_, Value::Array(rows)) => rows
                .iter()
                .map(SaleLine::from_value)
                .filter(|line| !line.variant_ref.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: raw.id("id"),
            client_name: raw.text_any(&["client.name", "client_name"]),
            date: raw.date("date"),
            total: raw.number("total"),
            status: raw.text("status"),
            lines,
        }
    }
}

impl Searchable for Sale {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::from(self.client_name.as_str()),
            Cow::from(self.status.as_str()),
        ];
        fields.extend(date_search_fields(self.date));
        fields
    }
}
