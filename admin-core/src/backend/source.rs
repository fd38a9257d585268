use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::repository::BackendError;

/// Backends the admin tools know how to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A directory of JSON exports, one file per collection.
    #[default]
    Json,
}

impl BackendKind {
    pub const ALL: [BackendKind; 1] = [Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    /// Case-insensitive; the error lists what is supported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                BackendError::Configuration(format!(
                    "unknown backend '{s}'; supported: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Which backend to open and where its data lives. For [`BackendKind::Json`]
/// `location` is the export directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub location: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Json,
            location: PathBuf::from("data"),
        }
    }
}
