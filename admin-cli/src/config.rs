//! `admin.toml` settings. Every field has a default, so an empty or missing
//! file is a valid configuration.
//!
//! ```toml
//! log_level = "info"
//!
//! [backend]
//! name = "json"
//! location = "data"
//!
//! [pages]
//! options = [5, 10, 20, 50]
//! default = 10
//!
//! [documents]
//! tax_rate = "0.19"
//!
//! [dashboard]
//! low_stock_threshold = 5
//! ```

use std::path::{Path, PathBuf};

use admin_core::backend::{BackendConfig, BackendKind};
use admin_core::collection::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use admin_core::dashboard::DEFAULT_LOW_STOCK_THRESHOLD;
use admin_core::line_items::DEFAULT_TAX_RATE;
use admin_core::{AggregatorConfig, PageSizes};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "admin.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("invalid config file: {0}")]
    Parse(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing filter; `RUST_LOG` overrides it.
    pub log_level: String,
    pub backend: BackendSection,
    pub pages: PageSection,
    pub documents: DocumentSection,
    pub dashboard: DashboardSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Unknown names fail to parse.
    pub name: BackendKind,
    pub location: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub options: Vec<usize>,
    pub default: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSection {
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    pub low_stock_threshold: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            backend: BackendSection::default(),
            pages: PageSection::default(),
            documents: DocumentSection::default(),
            dashboard: DashboardSection::default(),
        }
    }
}

impl Default for BackendSection {
    fn default() -> Self {
        let defaults = BackendConfig::default();
        Self {
            name: defaults.kind,
            location: defaults.location,
        }
    }
}

impl Default for PageSection {
    fn default() -> Self {
        Self {
            options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "config loaded");
        Self::from_toml_str(&text)
    }

    /// Reads `explicit` when given; otherwise [`DEFAULT_CONFIG_FILE`] when it
    /// exists; otherwise the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.page_sizes()?;
        self.aggregator_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.backend.location.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("backend location must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn page_sizes(&self) -> Result<PageSizes, ConfigError> {
        PageSizes::new(self.pages.options.clone(), self.pages.default)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            kind: self.backend.name,
            location: self.backend.location.clone(),
        }
    }

    /// Purchases and returns are both taxed at the configured rate.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig::taxed(self.documents.tax_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.documents.tax_rate, dec!(0.19));
        assert_eq!(config.backend_config(), BackendConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [documents]
            tax_rate = "0.08"

            [pages]
            options = [25, 5]
            default = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.documents.tax_rate, dec!(0.08));
        assert_eq!(config.page_sizes().unwrap().options(), &[5, 25]);
        assert_eq!(config.dashboard.low_stock_threshold, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn default_page_size_must_be_an_option() {
        let result = AppConfig::from_toml_str("[pages]\noptions = [5, 10]\ndefault = 7\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn tax_rate_above_one_is_rejected() {
        let result = AppConfig::from_toml_str("[documents]\ntax_rate = \"19\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = AppConfig::from_toml_str("[pages\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let result = AppConfig::discover(Some(Path::new("/no/such/admin.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn backend_section_reads_kind_and_location() {
        let text = "[backend]\nname = \"json\"\nlocation = \"exports\"\n";
        let config = AppConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config.backend_config(),
            BackendConfig {
                kind: BackendKind::Json,
                location: PathBuf::from("exports"),
            }
        );
    }

    #[test]
    fn unknown_backend_name_is_a_parse_error() {
        let result = AppConfig::from_toml_str("[backend]\nname = \"rest\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn documents_are_taxed_at_configured_rate() {
        let config = AppConfig::from_toml_str("[documents]\ntax_rate = \"0.08\"\n").unwrap();
        assert_eq!(config.aggregator_config(), AggregatorConfig::taxed(dec!(0.08)));
    }
}
