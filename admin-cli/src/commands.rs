//! The `admin` subcommands. Each writes its report to `out` so tests can
//! capture it.

use std::io::Write;
use std::path::{Path, PathBuf};

use admin_core::backend::{fetch_catalog, reload};
use admin_core::dashboard::DashboardSummary;
use admin_core::money::format_amount;
use admin_core::{
    AdminBackend, AggregatorConfig, Catalog, Client, CollectionAction, CollectionView, EntityKind,
    FromRaw, LineItemError, LineItemIssue, LineItems, PageSizes, Permission, Product, Provider,
    Purchase, RecordId, Role, Sale, SaleReturn, Searchable, SoldQuantities, User,
};
use admin_data::CatalogLoader;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::render::{Table, TableRow};

/// Opens the backend named in `config`.
pub async fn open_backend(config: &AppConfig) -> Result<Box<dyn AdminBackend>> {
    let backend_config = config.backend_config();
    admin_data::open_backend(&backend_config)
        .await
        .with_context(|| {
            format!(
                "cannot open {} backend at '{}'",
                backend_config.kind,
                backend_config.location.display()
            )
        })
}

// ─── list ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub search: Option<String>,
    pub page: i64,
    pub per_page: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            per_page: None,
        }
    }
}

/// Prints one page of `kind` as a table followed by
/// `page X / Y (N items)`.
pub async fn list(
    backend: &dyn AdminBackend,
    config: &AppConfig,
    kind: EntityKind,
    options: &ListOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let page_sizes = config.page_sizes()?;
    match kind {
        EntityKind::Users => list_as::<User>(backend, kind, page_sizes, options, out).await,
        EntityKind::Roles => list_as::<Role>(backend, kind, page_sizes, options, out).await,
        EntityKind::Permissions => {
            list_as::<Permission>(backend, kind, page_sizes, options, out).await
        }
        EntityKind::Clients => list_as::<Client>(backend, kind, page_sizes, options, out).await,
        EntityKind::Providers => list_as::<Provider>(backend, kind, page_sizes, options, out).await,
        EntityKind::Products => list_as::<Product>(backend, kind, page_sizes, options, out).await,
        EntityKind::Purchases => list_as::<Purchase>(backend, kind, page_sizes, options, out).await,
        EntityKind::Sales => list_as::<Sale>(backend, kind, page_sizes, options, out).await,
        EntityKind::Returns => list_as::<SaleReturn>(backend, kind, page_sizes, options, out).await,
    }
}

async fn list_as<T>(
    backend: &dyn AdminBackend,
    kind: EntityKind,
    page_sizes: PageSizes,
    options: &ListOptions,
    out: &mut dyn Write,
) -> Result<()>
where
    T: FromRaw + Searchable + TableRow,
{
    let mut view: CollectionView<T> = CollectionView::new(page_sizes);
    reload(backend, kind, &mut view)
        .await
        .with_context(|| format!("cannot load {kind}"))?;

    if let Some(n) = options.per_page {
        view.dispatch(CollectionAction::ItemsPerPage(n))?;
    }
    if let Some(term) = &options.search {
        view.dispatch(CollectionAction::Search(term.clone()))?;
    }
    view.dispatch(CollectionAction::Page(options.page))?;

    let page = view.view();
    write!(out, "{}", Table::from_rows(page.visible_items.iter().copied()))?;
    writeln!(
        out,
        "page {} / {} ({} items)",
        page.current_page, page.total_pages, page.total_items
    )?;
    if let Some(label) = T::AMOUNT_LABEL {
        writeln!(out, "{label}: {}", format_amount(view.sum_by(T::amount)))?;
    }
    Ok(())
}

// ─── totals ──────────────────────────────────────────────────────────────────

/// A document file: `{ "items": [{ "variant_ref": "...", "quantity": 2 }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentInput {
    pub items: Vec<DocumentLineInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentLineInput {
    pub variant_ref: String,
    pub quantity: i64,
    /// Overrides the catalog price (negotiated purchase cost).
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

impl DocumentInput {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read document '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid document '{}'", path.display()))
    }
}

/// Returned when a document fails submission checks.
#[derive(Debug, Error)]
#[error("document is not valid:\n{}", format_issues(.0))]
pub struct InvalidDocument(pub Vec<LineItemIssue>);

fn format_issues(issues: &[LineItemIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsOptions {
    pub document: PathBuf,
    /// CSV catalog; the backend's variants are used when absent.
    pub catalog: Option<PathBuf>,
    pub returns: bool,
    /// The sale a return is taken against.
    pub sale: Option<RecordId>,
    /// Send the validated payload to the backend.
    pub submit: bool,
}

impl TotalsOptions {
    /// Whether the command has to open the backend.
    pub fn needs_backend(&self) -> bool {
        self.catalog.is_none() || self.submit || self.sale.is_some()
    }
}

/// Fills a document from `input`. Lines naming a variant missing from the
/// catalog keep no variant and are reported by validation. With `sold` the
/// document is a return and each line is capped at the units sold.
pub fn build_document(
    input: &DocumentInput,
    catalog: &Catalog,
    config: AggregatorConfig,
    sold: Option<SoldQuantities>,
) -> Result<LineItems, LineItemError> {
    let mut items = LineItems::new(config)?;
    if let Some(sold) = sold {
        items.return_against(sold);
    }
    for line in &input.items {
        let index = items.add_item();
        if let Err(e) = items.set_variant(index, &line.variant_ref, catalog) {
            warn!(line = index + 1, error = %e, "line left without a variant");
        }
        items.set_quantity(index, line.quantity)?;
        if let Some(price) = line.unit_price {
            items.set_unit_price(index, price)?;
        }
    }
    Ok(items)
}

fn load_csv_catalog(path: &Path) -> Result<Catalog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open catalog '{}'", path.display()))?;
    let records = CatalogLoader::parse(file)
        .with_context(|| format!("cannot parse catalog '{}'", path.display()))?;
    Ok(CatalogLoader::load(records)?)
}

async fn sold_on_sale(
    backend: &dyn AdminBackend,
    sale_id: RecordId,
) -> Result<SoldQuantities> {
    let sales: Vec<Sale> = fetch_all(backend, EntityKind::Sales).await?;
    let sale = sales
        .into_iter()
        .find(|sale| sale.id == sale_id)
        .with_context(|| format!("sale #{sale_id} not found"))?;
    Ok(sale.sold_quantities())
}

/// Prints the document's lines and totals. Fails with [`InvalidDocument`]
/// after printing when the document cannot be submitted.
pub async fn totals(
    backend: Option<&dyn AdminBackend>,
    config: &AppConfig,
    options: &TotalsOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let input = DocumentInput::load(&options.document)?;

    let catalog = match (&options.catalog, backend) {
        (Some(path), _) => load_csv_catalog(path)?,
        (None, Some(backend)) => fetch_catalog(backend)
            .await
            .context("cannot load variant catalog")?,
        (None, None) => anyhow::bail!("no catalog file given and no backend available"),
    };

    let sold = if options.returns {
        let Some(sale_id) = options.sale else {
            anyhow::bail!("a return needs the sale it is taken against (--sale)");
        };
        let Some(backend) = backend else {
            anyhow::bail!("returns are checked against the backend's sales");
        };
        Some(sold_on_sale(backend, sale_id).await?)
    } else {
        None
    };

    let items = build_document(&input, &catalog, config.aggregator_config(), sold)?;

    write!(out, "{}", Table::from_rows(items.items()))?;
    let totals = items.totals().rounded();
    writeln!(out, "subtotal: {}", format_amount(totals.subtotal))?;
    writeln!(out, "tax:      {}", format_amount(totals.tax))?;
    writeln!(out, "total:    {}", format_amount(totals.total))?;

    let payload = items.to_payload().map_err(InvalidDocument)?;

    if options.submit {
        let Some(backend) = backend else {
            anyhow::bail!("submitting requires a backend");
        };
        let kind = if options.returns {
            EntityKind::Returns
        } else {
            EntityKind::Purchases
        };
        let saved = backend
            .submit(kind, serde_json::to_value(&payload)?)
            .await
            .with_context(|| format!("cannot submit {kind}"))?;
        info!(entity = %kind, "document submitted");
        writeln!(out, "submitted {kind} #{}", saved["id"])?;
    }
    Ok(())
}

// ─── dashboard ───────────────────────────────────────────────────────────────

async fn fetch_all<T: FromRaw>(
    backend: &dyn AdminBackend,
    kind: EntityKind,
) -> Result<Vec<T>> {
    let raw = backend
        .list(kind)
        .await
        .with_context(|| format!("cannot load {kind}"))?;
    Ok(raw.iter().map(T::from_value).collect())
}

pub async fn dashboard(
    backend: &dyn AdminBackend,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let sales: Vec<Sale> = fetch_all(backend, EntityKind::Sales).await?;
    let purchases: Vec<Purchase> = fetch_all(backend, EntityKind::Purchases).await?;
    let returns: Vec<SaleReturn> = fetch_all(backend, EntityKind::Returns).await?;
    let products: Vec<Product> = fetch_all(backend, EntityKind::Products).await?;

    let threshold = config.dashboard.low_stock_threshold;
    let summary =
        DashboardSummary::from_documents(&sales, &purchases, &returns, &products, threshold);

    writeln!(out, "sales:       {}", format_amount(summary.sales_total))?;
    writeln!(out, "purchases:   {}", format_amount(summary.purchases_total))?;
    writeln!(out, "returns:     {}", format_amount(summary.returns_total))?;
    writeln!(out, "net revenue: {}", format_amount(summary.net_revenue))?;
    writeln!(
        out,
        "low stock:   {} products at or below {threshold}",
        summary.low_stock_products
    )?;

    if !summary.monthly_sales.is_empty() {
        writeln!(out)?;
        let mut table = Table::new(&["MONTH", "SALES"]);
        for month in &summary.monthly_sales {
            table.push(vec![month.month.clone(), format_amount(month.total)]);
        }
        write!(out, "{table}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_raw_records(&[
            json!({"variant_ref": "TEE-M-BLK", "product_name": "Tee", "unit_price": "1000", "available_quantity": 4}),
            json!({"variant_ref": "CAP-U-RED", "product_name": "Cap", "unit_price": 500}),
        ])
    }

    fn input(lines: &[(&str, i64)]) -> DocumentInput {
        DocumentInput {
            items: lines
                .iter()
                .map(|(variant_ref, quantity)| DocumentLineInput {
                    variant_ref: variant_ref.to_string(),
                    quantity: *quantity,
                    unit_price: None,
                })
                .collect(),
        }
    }

    #[test]
    fn build_document_prices_lines_from_catalog() {
        let items = build_document(
            &input(&[("TEE-M-BLK", 4)]),
            &catalog(),
            AggregatorConfig::default(),
            None,
        )
        .unwrap();

        let totals = items.totals();
        assert_eq!(totals.subtotal, dec!(4000));
        assert_eq!(totals.tax, dec!(760));
        assert_eq!(totals.total, dec!(4760));
    }

    #[test]
    fn unknown_variant_surfaces_as_validation_issue() {
        let items =
            build_document(&input(&[("NOPE", 1)]), &catalog(), AggregatorConfig::default(), None)
                .unwrap();

        assert_eq!(
            items.validate_for_submit(),
            Err(vec![LineItemIssue::MissingVariant { index: 0 }])
        );
    }

    #[test]
    fn returns_clamp_to_units_sold_not_stock() {
        let sold = SoldQuantities::new(
            3,
            [("TEE-M-BLK".to_string(), 2), ("CAP-U-RED".to_string(), 5)],
        );
        let items = build_document(
            &input(&[("TEE-M-BLK", 9), ("CAP-U-RED", 5)]),
            &catalog(),
            AggregatorConfig::taxed(dec!(0.19)),
            Some(sold),
        )
        .unwrap();

        // 4 tees in stock, 2 sold.
        assert_eq!(items.items()[0].quantity, 2);
        assert_eq!(items.items()[1].quantity, 5);
        assert_eq!(items.to_payload().unwrap().sale_id, Some(3));
    }

    #[test]
    fn price_override_replaces_catalog_price() {
        let mut doc = input(&[("CAP-U-RED", 2)]);
        doc.items[0].unit_price = Some(dec!(450));

        let items = build_document(&doc, &catalog(), AggregatorConfig::default(), None).unwrap();

        assert_eq!(items.totals().subtotal, dec!(900));
    }

    #[test]
    fn invalid_document_lists_every_issue() {
        let err = InvalidDocument(vec![
            LineItemIssue::MissingVariant { index: 0 },
            LineItemIssue::NonPositiveQuantity {
                index: 1,
                quantity: 0,
            },
        ]);

        assert_eq!(
            err.to_string(),
            "document is not valid:\n  - line 1 has no product variant selected\n  - line 2 must have a quantity greater than zero (got 0)"
        );
    }

    #[test]
    fn backend_needed_unless_csv_catalog_and_no_submit() {
        let mut options = TotalsOptions {
            document: PathBuf::from("doc.json"),
            catalog: Some(PathBuf::from("variants.csv")),
            returns: false,
            sale: None,
            submit: false,
        };
        assert!(!options.needs_backend());
        options.submit = true;
        assert!(options.needs_backend());
        options.submit = false;
        options.sale = Some(1);
        assert!(options.needs_backend());
    }
}
