//! Plain-text tables for terminal output.

use std::fmt;

use admin_core::money::format_amount;
use admin_core::{
    Client, LineItem, Permission, Product, Provider, Purchase, Role, Sale, SaleReturn, User,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Columns a record contributes to `admin list`.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;

    /// Label for the footer sum over the filtered records, when the record
    /// carries an amount worth summing.
    const AMOUNT_LABEL: Option<&'static str> = None;

    fn amount(&self) -> Decimal {
        Decimal::ZERO
    }
}

/// A left-aligned table whose columns are as wide as their widest cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows<'a, T: TableRow + 'a>(items: impl IntoIterator<Item = &'a T>) -> Self {
        let mut table = Self::new(T::headers());
        for item in items {
            table.push(item.cells());
        }
        table
    }

    /// Short rows are padded with empty cells.
    pub fn push(
        &mut self,
        mut row: Vec<String>,
    ) {
        row.resize(self.headers.len().max(row.len()), String::new());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    cells: &[String],
    widths: &[usize],
) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for Table {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let widths = self.widths();
        write_row(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(f, &rule, &widths)?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

impl TableRow for User {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL", "ROLE", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role_name.clone(),
            self.status_label().to_string(),
        ]
    }
}

impl TableRow for Role {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DESCRIPTION", "PERMISSIONS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone(),
            self.permissions.join(", "),
        ]
    }
}

impl TableRow for Permission {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DESCRIPTION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.description.clone()]
    }
}

impl TableRow for Client {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DOCUMENT", "EMAIL", "PHONE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.document.clone(),
            self.email.clone(),
            self.phone.clone(),
        ]
    }
}

impl TableRow for Provider {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DOCUMENT", "EMAIL", "PHONE", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.document.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.status.clone(),
        ]
    }
}

impl TableRow for Product {
    const AMOUNT_LABEL: Option<&'static str> = Some("stock value");

    fn amount(&self) -> Decimal {
        self.stock_value()
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "CATEGORY", "PRICE", "STOCK"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            format_amount(self.price),
            self.stock.to_string(),
        ]
    }
}

impl TableRow for Purchase {
    const AMOUNT_LABEL: Option<&'static str> = Some("total");

    fn amount(&self) -> Decimal {
        self.total
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "PROVIDER", "DATE", "SUBTOTAL", "TAX", "TOTAL", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.provider_name.clone(),
            date_cell(self.date),
            format_amount(self.subtotal),
            format_amount(self.tax),
            format_amount(self.total),
            self.status.clone(),
        ]
    }
}

impl TableRow for Sale {
    const AMOUNT_LABEL: Option<&'static str> = Some("total");

    fn amount(&self) -> Decimal {
        self.total
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "CLIENT", "DATE", "TOTAL", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.client_name.clone(),
            date_cell(self.date),
            format_amount(self.total),
            self.status.clone(),
        ]
    }
}

impl TableRow for SaleReturn {
    const AMOUNT_LABEL: Option<&'static str> = Some("total");

    fn amount(&self) -> Decimal {
        self.total
    }

    fn headers() -> &'static [&'static str] {
        &["ID", "SALE", "CLIENT", "DATE", "TOTAL", "REASON", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sale_id.to_string(),
            self.client_name.clone(),
            date_cell(self.date),
            format_amount(self.total),
            self.reason.clone(),
            self.status.clone(),
        ]
    }
}

impl TableRow for LineItem {
    fn headers() -> &'static [&'static str] {
        &["VARIANT", "PRODUCT", "SIZE", "COLOR", "QTY", "UNIT PRICE", "LINE TOTAL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.variant_ref.clone().unwrap_or_else(|| "-".to_string()),
            self.product_name.clone(),
            self.size.clone(),
            self.color.clone(),
            self.quantity.to_string(),
            format_amount(self.unit_price),
            format_amount(self.line_total()),
        ]
    }
}
