use std::io::Read;

use admin_core::{Catalog, Variant};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a variant catalog.
#[derive(Debug, Error)]
pub enum CatalogLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Duplicate variant reference '{0}'")]
    DuplicateVariant(String),
}

impl From<csv::Error> for CatalogLoaderError {
    fn from(err: csv::Error) -> Self {
        CatalogLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the variants CSV file.
///
/// - `variant_ref`: identifier referenced by document lines
/// - `product_name`, `size`, `color`: descriptive fields copied onto lines
/// - `unit_price`: price per unit
/// - `available_quantity`: units available (empty for unlimited)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VariantRecord {
    pub variant_ref: String,
    pub product_name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub available_quantity: Option<i64>,
}

fn deserialize_optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl From<VariantRecord> for Variant {
    fn from(record: VariantRecord) -> Self {
        Variant {
            variant_ref: record.variant_ref,
            product_name: record.product_name,
            size: record.size,
            color: record.color,
            unit_price: record.unit_price,
            available_quantity: record.available_quantity,
        }
    }
}

/// Loader for variant catalogs exported as CSV.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse variant records from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<VariantRecord>, CatalogLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: VariantRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build a [`Catalog`] from parsed records.
    ///
    /// Variant references must be unique, otherwise a line could silently
    /// pick up the wrong price.
    pub fn load(records: Vec<VariantRecord>) -> Result<Catalog, CatalogLoaderError> {
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            if !seen.insert(record.variant_ref.as_str()) {
                return Err(CatalogLoaderError::DuplicateVariant(record.variant_ref.clone()));
            }
        }

        Ok(Catalog::new(records.into_iter().map(Variant::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"variant_ref,product_name,size,color,unit_price,available_quantity
TEE-M-BLK,Tee,M,Black,1000,4
TEE-L-BLK,Tee,L,Black,1000,
CAP-U-RED,Cap,,Red,500.50,12
"#;

    #[test]
    fn test_parse_csv() {
        let records = CatalogLoader::parse(TEST_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            VariantRecord {
                variant_ref: "TEE-M-BLK".to_string(),
                product_name: "Tee".to_string(),
                size: "M".to_string(),
                color: "Black".to_string(),
                unit_price: dec!(1000),
                available_quantity: Some(4),
            }
        );
        assert_eq!(records[1].available_quantity, None);
        assert_eq!(records[2].size, "");
        assert_eq!(records[2].unit_price, dec!(500.50));
    }

    #[test]
    fn test_load_builds_catalog() {
        let records = CatalogLoader::parse(TEST_CSV.as_bytes()).unwrap();
        let catalog = CatalogLoader::load(records).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find("CAP-U-RED").map(|v| v.label()), Some("Cap (Red)".to_string()));
    }

    #[test]
    fn test_duplicate_reference_is_rejected() {
        let csv = "variant_ref,product_name,size,color,unit_price,available_quantity\nA,X,,,1,\nA,Y,,,2,\n";
        let records = CatalogLoader::parse(csv.as_bytes()).unwrap();

        let result = CatalogLoader::load(records);

        assert!(matches!(result, Err(CatalogLoaderError::DuplicateVariant(ref r)) if r == "A"));
    }

    #[test]
    fn test_invalid_price_is_a_parse_error() {
        let csv = "variant_ref,product_name,size,color,unit_price,available_quantity\nA,X,,,cheap,\n";
        let result = CatalogLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(CatalogLoaderError::CsvParse(_))));
    }
}
