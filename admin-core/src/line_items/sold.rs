use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::VariantRef;
use crate::normalize::RecordId;

/// Units of each variant sold on one sale. A return against that sale may
/// not take back more than this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldQuantities {
    sale_id: RecordId,
    by_variant: BTreeMap<VariantRef, i64>,
}

impl SoldQuantities {
    /// Repeated variants are added together.
    pub fn new(
        sale_id: RecordId,
        lines: impl IntoIterator<Item = (VariantRef, i64)>,
    ) -> Self {
        let mut by_variant: BTreeMap<VariantRef, i64> = BTreeMap::new();
        for (variant_ref, quantity) in lines {
            let sold = by_variant.entry(variant_ref).or_default();
            *sold = sold.saturating_add(quantity);
        }
        Self { sale_id, by_variant }
    }

    pub fn sale_id(&self) -> RecordId {
        self.sale_id
    }

    /// Units sold of `variant_ref`, or `None` when the sale did not include it.
    pub fn sold(
        &self,
        variant_ref: &str,
    ) -> Option<i64> {
        self.by_variant.get(variant_ref).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variant.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn repeated_variants_accumulate() {
        let sold = SoldQuantities::new(
            7,
            [
                ("TEE-M".to_string(), 2),
                ("CAP".to_string(), 1),
                ("TEE-M".to_string(), 3),
            ],
        );

        assert_eq!(sold.sale_id(), 7);
        assert_eq!(sold.sold("TEE-M"), Some(5));
        assert_eq!(sold.sold("CAP"), Some(1));
        assert_eq!(sold.sold("HAT"), None);
    }

    #[test]
    fn accumulation_saturates() {
        let sold = SoldQuantities::new(1, [("A".to_string(), i64::MAX), ("A".to_string(), 1)]);
        assert_eq!(sold.sold("A"), Some(i64::MAX));
    }
}
