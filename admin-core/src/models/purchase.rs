use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::date_search_fields;
use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

/// A purchase document placed with a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: RecordId,
    pub provider_name: String,
    pub date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
}

impl FromRaw for Purchase {
    fn from_raw(raw: &RawRecord) -> Self {
        let subtotal = raw.number("subtotal");
        let tax = raw.number("tax");
        // Records without a total get one from subtotal and tax.
        let total = if raw.field("total").is_null() {
            subtotal.checked_add(tax).unwrap_or_else(|| {
                warn!(%subtotal, %tax, "derived total out of range; using 0");
                Decimal::ZERO
            })
        } else {
            raw.number("total")
        };
        Self {
            id: raw.id("id"),
            provider_name: raw.text_any(&["provider.name", "provider_name"]),
            date: raw.date("date"),
            subtotal,
            tax,
            total,
            status: raw.text("status"),
        }
    }
}

impl Searchable for Purchase {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::from(self.provider_name.as_str()),
            Cow::from(self.status.as_str()),
        ];
        fields.extend(date_search_fields(self.date));
        fields
    }
}
