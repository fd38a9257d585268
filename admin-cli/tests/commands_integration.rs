//! Drives the `admin` subcommands against the fixture data directory and
//! checks the printed reports.

use std::path::{Path, PathBuf};

use admin_cli::commands::{self, InvalidDocument, ListOptions, TotalsOptions};
use admin_cli::config::AppConfig;
use admin_core::backend::BackendKind;
use admin_core::{AdminBackend, EntityKind, FromRaw, LineItemIssue, SaleReturn};
use admin_data::JsonDirBackend;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_backend() -> JsonDirBackend {
    JsonDirBackend::new(fixture("data"))
}

/// A scratch data directory holding copies of the named fixture files.
fn scratch_data(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::copy(fixture("data").join(name), dir.path().join(name)).unwrap();
    }
    dir
}

fn lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out).lines().map(str::to_string).collect()
}

fn totals_options(document: &str) -> TotalsOptions {
    TotalsOptions {
        document: fixture(document),
        catalog: None,
        returns: false,
        sale: None,
        submit: false,
    }
}

fn return_options(sale: i64) -> TotalsOptions {
    TotalsOptions {
        returns: true,
        sale: Some(sale),
        ..totals_options("return_document.json")
    }
}

// ─── config ──────────────────────────────────────────────────────────────────

#[test]
fn test_fixture_config_file() {
    let config = AppConfig::load(&fixture("admin.toml")).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.page_sizes().unwrap().options(), &[2, 5]);
    assert_eq!(config.documents.tax_rate, dec!(0.10));
    assert_eq!(config.dashboard.low_stock_threshold, 2);
    assert_eq!(config.backend_config().kind, BackendKind::Json);
    assert_eq!(
        config.backend_config().location,
        PathBuf::from("tests/fixtures/data")
    );
}

// ─── list ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_providers_with_search() {
    let mut out = Vec::new();
    let options = ListOptions {
        search: Some("DOE".to_string()),
        ..ListOptions::default()
    };

    commands::list(
        &fixture_backend(),
        &AppConfig::default(),
        EntityKind::Providers,
        &options,
        &mut out,
    )
    .await
    .unwrap();

    let text = String::from_utf8(out.clone()).unwrap();
    assert!(text.contains("John Doe Supplies"));
    assert!(text.contains("Doe & Sons"));
    assert!(!text.contains("Jane Textiles"));
    assert_eq!(lines(&out).last().unwrap(), "page 1 / 1 (2 items)");
}

#[tokio::test]
async fn test_list_second_page_with_configured_page_size() {
    let config = AppConfig::load(&fixture("admin.toml")).unwrap();
    let mut out = Vec::new();
    let options = ListOptions {
        page: 2,
        ..ListOptions::default()
    };

    commands::list(&fixture_backend(), &config, EntityKind::Providers, &options, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out.clone()).unwrap();
    assert!(text.contains("Doe & Sons"));
    assert!(!text.contains("John Doe Supplies"));
    assert_eq!(lines(&out).last().unwrap(), "page 2 / 2 (3 items)");
}

#[tokio::test]
async fn test_list_clamps_out_of_range_page() {
    let mut out = Vec::new();
    let options = ListOptions {
        page: 40,
        ..ListOptions::default()
    };

    commands::list(
        &fixture_backend(),
        &AppConfig::default(),
        EntityKind::Providers,
        &options,
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(lines(&out).last().unwrap(), "page 1 / 1 (3 items)");
}

#[tokio::test]
async fn test_list_rejects_unlisted_page_size() {
    let mut out = Vec::new();
    let options = ListOptions {
        per_page: Some(7),
        ..ListOptions::default()
    };

    let result = commands::list(
        &fixture_backend(),
        &AppConfig::default(),
        EntityKind::Providers,
        &options,
        &mut out,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_list_documents_prints_filtered_total() {
    let mut out = Vec::new();

    commands::list(
        &fixture_backend(),
        &AppConfig::default(),
        EntityKind::Sales,
        &ListOptions::default(),
        &mut out,
    )
    .await
    .unwrap();

    let lines = lines(&out);
    assert_eq!(lines[lines.len() - 2], "page 1 / 1 (2 items)");
    assert_eq!(lines[lines.len() - 1], "total: 4,500.50");
}

#[tokio::test]
async fn test_list_missing_collection_is_empty() {
    let mut out = Vec::new();

    commands::list(
        &fixture_backend(),
        &AppConfig::default(),
        EntityKind::Users,
        &ListOptions::default(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        lines(&out),
        vec![
            "ID  NAME  EMAIL  ROLE  STATUS",
            "--  ----  -----  ----  ------",
            "page 1 / 1 (0 items)",
        ]
    );
}

// ─── totals ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_totals_with_backend_catalog() {
    let backend = fixture_backend();
    let mut out = Vec::new();

    commands::totals(
        Some(&backend),
        &AppConfig::default(),
        &totals_options("purchase_document.json"),
        &mut out,
    )
    .await
    .unwrap();

    let lines = lines(&out);
    assert_eq!(
        lines[lines.len() - 3..].to_vec(),
        vec!["subtotal: 4,000.00", "tax:      760.00", "total:    4,760.00"]
    );
}

#[tokio::test]
async fn test_totals_uses_configured_tax_rate() {
    let backend = fixture_backend();
    let config = AppConfig::load(&fixture("admin.toml")).unwrap();
    let mut out = Vec::new();

    commands::totals(
        Some(&backend),
        &config,
        &totals_options("purchase_document.json"),
        &mut out,
    )
    .await
    .unwrap();

    assert!(lines(&out).contains(&"tax:      400.00".to_string()));
}

#[tokio::test]
async fn test_return_is_capped_by_units_sold() {
    let backend = fixture_backend();
    let mut options = return_options(1);
    options.catalog = Some(fixture("variants.csv"));
    assert!(options.needs_backend());
    let mut out = Vec::new();

    commands::totals(Some(&backend), &AppConfig::default(), &options, &mut out)
        .await
        .unwrap();

    // Sale 1 sold 2 tees and 1 cap; stock is 4 and 2.
    let lines = lines(&out);
    assert_eq!(
        lines[lines.len() - 3..].to_vec(),
        vec!["subtotal: 2,500.00", "tax:      475.00", "total:    2,975.00"]
    );
}

#[tokio::test]
async fn test_return_against_sale_without_those_variants_is_invalid() {
    let backend = fixture_backend();
    let mut out = Vec::new();

    let err = commands::totals(Some(&backend), &AppConfig::default(), &return_options(2), &mut out)
        .await
        .unwrap_err();

    let invalid = err.downcast_ref::<InvalidDocument>().expect("expected InvalidDocument");
    assert_eq!(
        invalid.0,
        vec![
            LineItemIssue::NotInSale {
                index: 0,
                variant_ref: "TEE-M-BLK".to_string(),
                sale_id: 2,
            },
            LineItemIssue::NotInSale {
                index: 1,
                variant_ref: "CAP-U-RED".to_string(),
                sale_id: 2,
            },
        ]
    );
}

#[tokio::test]
async fn test_return_needs_a_known_sale() {
    let backend = fixture_backend();
    let mut out = Vec::new();

    let err = commands::totals(Some(&backend), &AppConfig::default(), &return_options(99), &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "sale #99 not found");

    let mut options = return_options(1);
    options.sale = None;
    let err = commands::totals(Some(&backend), &AppConfig::default(), &options, &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "a return needs the sale it is taken against (--sale)");
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_submit_return_records_its_sale() {
    let dir = scratch_data(&["sales.json", "variants.json", "returns.json"]);
    let backend = JsonDirBackend::new(dir.path());
    let mut options = return_options(1);
    options.submit = true;
    let mut out = Vec::new();

    commands::totals(Some(&backend), &AppConfig::default(), &options, &mut out)
        .await
        .unwrap();

    assert_eq!(lines(&out).last().unwrap(), "submitted returns #2");
    let raw = backend.list(EntityKind::Returns).await.unwrap();
    let saved = SaleReturn::from_value(&raw[1]);
    assert_eq!(saved.id, 2);
    assert_eq!(saved.sale_id, 1);
    assert_eq!(saved.total, dec!(2975));
}

#[tokio::test]
async fn test_invalid_document_reports_every_issue() {
    let backend = fixture_backend();
    let mut out = Vec::new();

    let err = commands::totals(
        Some(&backend),
        &AppConfig::default(),
        &totals_options("invalid_document.json"),
        &mut out,
    )
    .await
    .unwrap_err();

    let invalid = err.downcast_ref::<InvalidDocument>().expect("expected InvalidDocument");
    assert_eq!(
        invalid.0,
        vec![
            LineItemIssue::MissingVariant { index: 0 },
            LineItemIssue::NonPositiveQuantity {
                index: 1,
                quantity: 0
            },
        ]
    );
    // Lines and totals are still printed before the failure.
    assert!(lines(&out).contains(&"subtotal: 0.00".to_string()));
}

#[tokio::test]
async fn test_missing_document_is_an_error() {
    let backend = fixture_backend();
    let mut out = Vec::new();

    let result = commands::totals(
        Some(&backend),
        &AppConfig::default(),
        &totals_options("no_such_document.json"),
        &mut out,
    )
    .await;

    assert!(result.is_err());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_submit_appends_purchase() {
    let dir = scratch_data(&["purchases.json", "variants.json"]);
    let backend = JsonDirBackend::new(dir.path());
    let mut options = totals_options("purchase_document.json");
    options.submit = true;
    let mut out = Vec::new();

    commands::totals(Some(&backend), &AppConfig::default(), &options, &mut out)
        .await
        .unwrap();

    assert_eq!(lines(&out).last().unwrap(), "submitted purchases #2");

    let mut listing = Vec::new();
    commands::list(
        &backend,
        &AppConfig::default(),
        EntityKind::Purchases,
        &ListOptions::default(),
        &mut listing,
    )
    .await
    .unwrap();
    assert!(lines(&listing).contains(&"total: 9,520.00".to_string()));
}

// ─── dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_summary() {
    let mut out = Vec::new();

    commands::dashboard(&fixture_backend(), &AppConfig::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(
        lines(&out),
        vec![
            "sales:       4,500.50",
            "purchases:   4,760.00",
            "returns:     1,000.00",
            "net revenue: 3,500.50",
            "low stock:   1 products at or below 5",
            "",
            "MONTH    SALES",
            "-------  --------",
            "2024-01  3,000.00",
            "2024-02  1,500.50",
        ]
    );
}

// ─── backend ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_open_backend_uses_configured_data_dir() {
    let mut config = AppConfig::default();
    config.backend.location = fixture("data");

    let backend = commands::open_backend(&config).await.unwrap();
    let providers = backend.list(EntityKind::Providers).await.unwrap();

    assert_eq!(providers.len(), 3);
}

#[tokio::test]
async fn test_open_backend_reports_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.backend.location = dir.path().join("missing");

    let err = commands::open_backend(&config).await.err().expect("expected an error");

    assert!(err.to_string().starts_with("cannot open json backend at"));
}
