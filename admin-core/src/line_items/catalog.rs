use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, to_count};

/// Identifier of a product variant (a size/color combination).
pub type VariantRef = String;

/// One selectable product variant as returned by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_ref: VariantRef,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub unit_price: Decimal,
    /// Stock on hand, when the catalog reports it.
    pub available_quantity: Option<i64>,
}

impl Variant {
    /// `"Tee (M, Black)"`-style label used by selectors and reports.
    pub fn label(&self) -> String {
        let details: Vec<&str> = [self.size.as_str(), self.color.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if details.is_empty() {
            self.product_name.clone()
        } else {
            format!("{} ({})", self.product_name, details.join(", "))
        }
    }
}

impl FromRaw for Variant {
    fn from_raw(raw: &RawRecord) -> Self {
        let available = raw.path("available_quantity");
        let available = if available.is_null() { raw.path("stock") } else { available };
        Self {
            variant_ref: raw.text_any(&["variant_ref", "id"]),
            product_name: raw.text_any(&["product_name", "product.name", "name"]),
            size: raw.text_any(&["size.name", "size"]),
            color: raw.text_any(&["color.name", "color"]),
            unit_price: raw.number("unit_price"),
            available_quantity: (!available.is_null()).then(|| to_count(available)),
        }
    }
}

impl Searchable for Variant {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.variant_ref.as_str()),
            Cow::from(self.product_name.as_str()),
            Cow::from(self.size.as_str()),
            Cow::from(self.color.as_str()),
        ]
    }
}

/// Lookup table of variants supplied by the caller to
/// [`LineItems::set_variant`](super::LineItems::set_variant).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    variants: Vec<Variant>,
}

impl Catalog {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    /// Builds a catalog from raw backend records, coercing numeric fields.
    pub fn from_raw_records(raw: &[Value]) -> Self {
        Self::new(raw.iter().map(Variant::from_value).collect())
    }

    pub fn find(
        &self,
        variant_ref: &str,
    ) -> Option<&Variant> {
        self.variants.iter().find(|v| v.variant_ref == variant_ref)
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
