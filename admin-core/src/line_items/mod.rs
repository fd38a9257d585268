//! Editable line items of a purchase or return document and their totals.
//!
//! [`LineItems`] holds the rows a user is editing in a document form. Totals
//! are never stored: [`LineItems::totals`] recomputes them from the current
//! rows, so they cannot drift from the item list.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use admin_core::{AggregatorConfig, Catalog, LineItems, Variant};
//!
//! let catalog = Catalog::new(vec![Variant {
//!     variant_ref: "TEE-M".to_string(),
//!     product_name: "Tee".to_string(),
//!     size: "M".to_string(),
//!     color: "Black".to_string(),
//!     unit_price: dec!(1000),
//!     available_quantity: None,
//! }]);
//!
//! let mut items = LineItems::new(AggregatorConfig::default()).unwrap();
//! let row = items.add_item();
//! items.set_variant(row, "TEE-M", &catalog).unwrap();
//! items.set_quantity(row, 3).unwrap();
//!
//! let totals = items.totals();
//! assert_eq!(totals.subtotal, dec!(3000));
//! assert_eq!(totals.tax, dec!(570));
//! assert_eq!(totals.total, dec!(3570));
//! ```

mod catalog;
mod sold;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::money::{round_half_up, saturating_sum};
use crate::normalize::RecordId;

pub use catalog::{Catalog, Variant, VariantRef};
pub use sold::SoldQuantities;

/// Tax rate applied to document subtotals unless configured otherwise (19%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);

/// Errors returned by line-item edits. The item list is left untouched
/// whenever one of these is returned, so callers may ignore them and rely on
/// [`LineItems::validate_for_submit`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The index does not refer to a current row.
    #[error("no line item at index {index} (document has {len})")]
    NoSuchItem { index: usize, len: usize },

    /// The variant reference is not in the supplied catalog.
    #[error("variant '{0}' is not in the catalog")]
    UnknownVariant(String),

    /// The tax rate must be between 0 and 1.
    #[error("tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(Decimal),
}

/// A problem that blocks submission of a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineItemIssue {
    #[error("the document has no line items")]
    NoItems,

    #[error("line {} has no product variant selected", .index + 1)]
    MissingVariant { index: usize },

    #[error("line {} must have a quantity greater than zero (got {quantity})", .index + 1)]
    NonPositiveQuantity { index: usize, quantity: i64 },

    #[error("line {} quantity {quantity} exceeds the maximum of {max}", .index + 1)]
    QuantityOverCap { index: usize, quantity: i64, max: i64 },

    #[error("line {} has a negative unit price ({unit_price})", .index + 1)]
    NegativeUnitPrice { index: usize, unit_price: Decimal },

    #[error("line {} variant '{variant_ref}' was not part of sale #{sale_id}", .index + 1)]
    NotInSale {
        index: usize,
        variant_ref: VariantRef,
        sale_id: RecordId,
    },

    #[error("line {} total is too large to represent", .index + 1)]
    LineTotalOutOfRange { index: usize },

    #[error("the document total is too large to represent")]
    TotalOutOfRange,
}

/// How a document computes tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Rate applied to the subtotal. `None` means the document is untaxed.
    pub tax_rate: Option<Decimal>,
}

impl AggregatorConfig {
    pub fn taxed(tax_rate: Decimal) -> Self {
        Self {
            tax_rate: Some(tax_rate),
        }
    }

    pub fn untaxed() -> Self {
        Self { tax_rate: None }
    }

    /// # Errors
    ///
    /// [`LineItemError::InvalidTaxRate`] if the tax rate is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), LineItemError> {
        match self.tax_rate {
            Some(rate) if rate < Decimal::ZERO || rate > Decimal::ONE => {
                Err(LineItemError::InvalidTaxRate(rate))
            }
            _ => Ok(()),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::taxed(DEFAULT_TAX_RATE)
    }
}

/// One row of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub variant_ref: Option<VariantRef>,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub max_quantity: Option<i64>,
}

impl LineItem {
    /// A blank row: no variant, zero price, quantity 1.
    pub fn placeholder() -> Self {
        Self {
            variant_ref: None,
            product_name: String::new(),
            size: String::new(),
            color: String::new(),
            unit_price: Decimal::ZERO,
            quantity: 1,
            max_quantity: None,
        }
    }

    /// `unit_price × quantity`, saturating when the product does not fit in
    /// a [`Decimal`].
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    fn capped(
        &self,
        quantity: i64,
    ) -> i64 {
        match self.max_quantity {
            Some(max) => quantity.min(max),
            None => quantity,
        }
    }
}

/// A tagged edit to one row, for callers that route form events through a
/// single reducer instead of updating fields by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemEdit {
    Variant(VariantRef),
    Quantity(i64),
    UnitPrice(Decimal),
    MaxQuantity(Option<i64>),
}

/// Derived document totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Computes totals for `items` at `tax_rate`. Amounts that do not fit in
    /// a [`Decimal`] saturate; [`Totals::checked_compute`] reports them
    /// instead.
    pub fn compute<'a>(
        items: impl IntoIterator<Item = &'a LineItem>,
        tax_rate: Option<Decimal>,
    ) -> Self {
        let subtotal = saturating_sum(items.into_iter().map(LineItem::line_total));
        let tax = tax_rate.map_or(Decimal::ZERO, |rate| subtotal.saturating_mul(rate));
        Self {
            subtotal,
            tax,
            total: subtotal.saturating_add(tax),
        }
    }

    /// Like [`Totals::compute`], but `None` when any amount overflows.
    pub fn checked_compute<'a>(
        items: impl IntoIterator<Item = &'a LineItem>,
        tax_rate: Option<Decimal>,
    ) -> Option<Self> {
        let subtotal = items
            .into_iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.checked_line_total()?))?;
        let tax = match tax_rate {
            Some(rate) => subtotal.checked_mul(rate)?,
            None => Decimal::ZERO,
        };
        Some(Self {
            subtotal,
            tax,
            total: subtotal.checked_add(tax)?,
        })
    }

    /// Each amount rounded half-up to cents, for display and payloads.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_half_up(self.subtotal),
            tax: round_half_up(self.tax),
            total: round_half_up(self.total),
        }
    }
}

/// One submitted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLine {
    pub variant_ref: VariantRef,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The body handed to a submission endpoint: validated rows plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// The sale a return is taken against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<RecordId>,
    pub lines: Vec<PayloadLine>,
    #[serde(flatten)]
    pub totals: Totals,
}

/// The editable rows of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItems {
    config: AggregatorConfig,
    items: Vec<LineItem>,
    sold: Option<SoldQuantities>,
}

impl LineItems {
    /// Creates an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::InvalidTaxRate`] if the configuration is
    /// invalid.
    pub fn new(config: AggregatorConfig) -> Result<Self, LineItemError> {
        config.validate()?;
        Ok(Self {
            config,
            items: Vec::new(),
            sold: None,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// The sale this document returns goods against, if any.
    pub fn sold(&self) -> Option<&SoldQuantities> {
        self.sold.as_ref()
    }

    /// Makes this document a return against the sale behind `sold`.
    ///
    /// Every row with a variant is capped at the units sold of that variant
    /// (0 when the sale did not include it), and rows pointed at a variant
    /// later are capped the same way.
    pub fn return_against(
        &mut self,
        sold: SoldQuantities,
    ) {
        for item in &mut self.items {
            if let Some(variant_ref) = &item.variant_ref {
                item.max_quantity = Some(sold.sold(variant_ref).unwrap_or(0));
                item.quantity = item.capped(item.quantity);
            }
        }
        debug!(sale_id = sold.sale_id(), "document caps taken from sale");
        self.sold = Some(sold);
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut LineItem, LineItemError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(LineItemError::NoSuchItem { index, len })
    }

    /// Appends a blank row and returns its index.
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::placeholder());
        self.items.len() - 1
    }

    /// Removes the row at `index`. Later rows shift down by one, so indices
    /// held by the caller must be refreshed.
    ///
    /// # Errors
    ///
    /// [`LineItemError::NoSuchItem`] if `index` is out of range.
    pub fn remove_item(
        &mut self,
        index: usize,
    ) -> Result<LineItem, LineItemError> {
        if index >= self.items.len() {
            return Err(LineItemError::NoSuchItem {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Empties the document (form reset, cancel or after submission). A
    /// sale set by [`return_against`](Self::return_against) is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Points row `index` at a catalog variant, copying its price and
    /// descriptive fields and resetting the quantity to 1.
    ///
    /// On a return (see [`return_against`](Self::return_against)) the row's
    /// cap becomes the units sold of the new variant.
    ///
    /// # Errors
    ///
    /// * [`LineItemError::NoSuchItem`] if `index` is out of range.
    /// * [`LineItemError::UnknownVariant`] if `variant_ref` is not in
    ///   `catalog`; the row's price and description are left unchanged.
    pub fn set_variant(
        &mut self,
        index: usize,
        variant_ref: &str,
        catalog: &Catalog,
    ) -> Result<(), LineItemError> {
        let cap = self
            .sold
            .as_ref()
            .map(|sold| sold.sold(variant_ref).unwrap_or(0));
        let item = self.item_mut(index)?;

        let Some(variant) = catalog.find(variant_ref) else {
            warn!(index, variant_ref, "variant not found in catalog; line left unchanged");
            return Err(LineItemError::UnknownVariant(variant_ref.to_string()));
        };

        item.variant_ref = Some(variant.variant_ref.clone());
        item.product_name = variant.product_name.clone();
        item.size = variant.size.clone();
        item.color = variant.color.clone();
        item.unit_price = variant.unit_price;
        if cap.is_some() {
            item.max_quantity = cap;
        }
        item.quantity = item.capped(1);

        debug!(index, variant_ref, price = %item.unit_price, "line variant selected");
        Ok(())
    }

    /// Stores `value` as the row's quantity, clamped to the row's cap when
    /// one applies. Non-positive values are stored as typed; they are
    /// rejected by [`validate_for_submit`](Self::validate_for_submit).
    /// Returns the stored quantity.
    ///
    /// # Errors
    ///
    /// [`LineItemError::NoSuchItem`] if `index` is out of range.
    pub fn set_quantity(
        &mut self,
        index: usize,
        value: i64,
    ) -> Result<i64, LineItemError> {
        let item = self.item_mut(index)?;
        item.quantity = item.capped(value);
        if item.quantity != value {
            debug!(index, requested = value, stored = item.quantity, "quantity clamped to cap");
        }
        Ok(item.quantity)
    }

    /// Overrides the row's unit price (e.g. a negotiated purchase cost).
    ///
    /// # Errors
    ///
    /// [`LineItemError::NoSuchItem`] if `index` is out of range.
    pub fn set_unit_price(
        &mut self,
        index: usize,
        unit_price: Decimal,
    ) -> Result<(), LineItemError> {
        self.item_mut(index)?.unit_price = unit_price;
        Ok(())
    }

    /// Sets or clears the row's quantity cap, clamping the current quantity
    /// to the new cap.
    ///
    /// # Errors
    ///
    /// [`LineItemError::NoSuchItem`] if `index` is out of range.
    pub fn set_max_quantity(
        &mut self,
        index: usize,
        max_quantity: Option<i64>,
    ) -> Result<(), LineItemError> {
        let item = self.item_mut(index)?;
        item.max_quantity = max_quantity;
        item.quantity = item.capped(item.quantity);
        Ok(())
    }

    /// Applies one tagged edit to row `index`.
    ///
    /// # Errors
    ///
    /// Whatever the corresponding setter returns.
    pub fn apply(
        &mut self,
        index: usize,
        edit: LineItemEdit,
        catalog: &Catalog,
    ) -> Result<(), LineItemError> {
        match edit {
            LineItemEdit::Variant(variant_ref) => self.set_variant(index, &variant_ref, catalog),
            LineItemEdit::Quantity(value) => self.set_quantity(index, value).map(|_| ()),
            LineItemEdit::UnitPrice(price) => self.set_unit_price(index, price),
            LineItemEdit::MaxQuantity(max) => self.set_max_quantity(index, max),
        }
    }

    /// Subtotal, tax and total for the current rows.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.items, self.config.tax_rate)
    }

    /// Checks every row and reports all problems at once.
    ///
    /// Rules:
    /// - the document has at least one row
    /// - every row references a variant, and on a return one the sale
    ///   included
    /// - every quantity is greater than zero and within its cap
    /// - no unit price is negative
    /// - every line total and the document total fit in a [`Decimal`]
    pub fn validate_for_submit(&self) -> Result<(), Vec<LineItemIssue>> {
        let mut errors = Vec::new();

        if self.items.is_empty() {
            errors.push(LineItemIssue::NoItems);
        }

        let mut lines_in_range = true;
        for (index, item) in self.items.iter().enumerate() {
            let mut not_in_sale = false;
            match (&item.variant_ref, &self.sold) {
                (None, _) => errors.push(LineItemIssue::MissingVariant { index }),
                (Some(variant_ref), Some(sold)) if sold.sold(variant_ref).is_none() => {
                    not_in_sale = true;
                    errors.push(LineItemIssue::NotInSale {
                        index,
                        variant_ref: variant_ref.clone(),
                        sale_id: sold.sale_id(),
                    });
                }
                _ => {}
            }
            // A variant missing from the sale is capped at 0; that is
            // already reported above.
            if item.quantity <= 0 && !not_in_sale {
                errors.push(LineItemIssue::NonPositiveQuantity {
                    index,
                    quantity: item.quantity,
                });
            }
            if let Some(max) = item.max_quantity.filter(|max| item.quantity > *max) {
                errors.push(LineItemIssue::QuantityOverCap {
                    index,
                    quantity: item.quantity,
                    max,
                });
            }
            if item.unit_price < Decimal::ZERO {
                errors.push(LineItemIssue::NegativeUnitPrice {
                    index,
                    unit_price: item.unit_price,
                });
            }
            if item.checked_line_total().is_none() {
                lines_in_range = false;
                errors.push(LineItemIssue::LineTotalOutOfRange { index });
            }
        }

        if lines_in_range && Totals::checked_compute(&self.items, self.config.tax_rate).is_none() {
            errors.push(LineItemIssue::TotalOutOfRange);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validates the document and builds its submission payload.
    ///
    /// # Errors
    ///
    /// Every [`LineItemIssue`] found by
    /// [`validate_for_submit`](Self::validate_for_submit).
    pub fn to_payload(&self) -> Result<DocumentPayload, Vec<LineItemIssue>> {
        self.validate_for_submit()?;

        let lines = self
            .items
            .iter()
            .filter_map(|item| {
                item.variant_ref.as_ref().map(|variant_ref| PayloadLine {
                    variant_ref: variant_ref.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total(),
                })
            })
            .collect();

        Ok(DocumentPayload {
            sale_id: self.sold.as_ref().map(SoldQuantities::sale_id),
            lines,
            totals: self.totals().rounded(),
        })
    }
}
