use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::date_search_fields;
use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId, to_id};

/// Goods returned against an earlier sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReturn {
    pub id: RecordId,
    pub sale_id: RecordId,
    pub client_name: String,
    pub date: Option<NaiveDate>,
    pub total: Decimal,
    pub reason: String,
    pub status: String,
}

impl FromRaw for SaleReturn {
    fn from_raw(raw: &RawRecord) -> Self {
        let sale_id = if raw.field("sale_id").is_null() {
            to_id(raw.path("sale.id"))
        } else {
            raw.id("sale_id")
        };
        Self {
            id: raw.id("id"),
            sale_id,
            client_name: raw.text_any(&["sale.client_name", "client.name", "client_name"]),
            date: raw.date("date"),
            total: raw.number("total"),
            reason: raw.text("reason"),
            status: raw.text("status"),
        }
    }
}

impl Searchable for SaleReturn {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::from(self.client_name.as_str()),
            Cow::from(self.reason.as_str()),
            Cow::from(self.status.as_str()),
        ];
        fields.extend(date_search_fields(self.date));
        fields
    }
}
