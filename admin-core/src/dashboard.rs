//! Aggregate figures shown on the dashboard. Rendering them as charts is the
//! caller's concern.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, Purchase, Sale, SaleReturn};
use crate::money::saturating_sum;

/// Stock level at or below which a product counts as running low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Sales total for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub sales_total: Decimal,
    pub purchases_total: Decimal,
    pub returns_total: Decimal,
    /// Sales minus returns.
    pub net_revenue: Decimal,
    pub low_stock_products: usize,
    /// Chronological; undated sales count toward `sales_total` only.
    pub monthly_sales: Vec<MonthlyTotal>,
}

impl DashboardSummary {
    pub fn from_documents(
        sales: &[Sale],
        purchases: &[Purchase],
        returns: &[SaleReturn],
        products: &[Product],
        low_stock_threshold: i64,
    ) -> Self {
        let sales_total = saturating_sum(sales.iter().map(|s| s.total));
        let purchases_total = saturating_sum(purchases.iter().map(|p| p.total));
        let returns_total = saturating_sum(returns.iter().map(|r| r.total));

        let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for sale in sales {
            if let Some(date) = sale.date {
                let month = by_month.entry((date.year(), date.month())).or_default();
                *month = month.saturating_add(sale.total);
            }
        }

        Self {
            sales_total,
            purchases_total,
            returns_total,
            net_revenue: sales_total.saturating_sub(returns_total),
            low_stock_products: products
                .iter()
                .filter(|p| p.stock <= low_stock_threshold)
                .count(),
            monthly_sales: by_month
                .into_iter()
                .map(|((year, month), total)| MonthlyTotal {
                    month: format!("{year:04}-{month:02}"),
                    total,
                })
                .collect(),
        }
    }
}
