use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every entity the admin screens manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Roles,
    Permissions,
    Clients,
    Providers,
    Products,
    Purchases,
    Sales,
    Returns,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        Self::Users,
        Self::Roles,
        Self::Permissions,
        Self::Clients,
        Self::Providers,
        Self::Products,
        Self::Purchases,
        Self::Sales,
        Self::Returns,
    ];

    /// Collection name used by backends (`"purchases"`, `"returns"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Permissions => "permissions",
            Self::Clients => "clients",
            Self::Providers => "providers",
            Self::Products => "products",
            Self::Purchases => "purchases",
            Self::Sales => "sales",
            Self::Returns => "returns",
        }
    }

    /// Accepts the collection name, case-insensitively. `"suppliers"` is
    /// accepted for providers.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if s == "suppliers" {
            return Some(Self::Providers);
        }
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
            format!("unknown entity '{s}'; expected one of {}", known.join(", "))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_collection_name() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_knows_suppliers() {
        assert_eq!(EntityKind::parse(" Purchases "), Some(EntityKind::Purchases));
        assert_eq!(EntityKind::parse("suppliers"), Some(EntityKind::Providers));
        assert_eq!(EntityKind::parse("invoices"), None);
    }

    #[test]
    fn from_str_error_lists_known_entities() {
        let err = "invoices".parse::<EntityKind>().unwrap_err();
        assert!(err.contains("invoices"));
        assert!(err.contains("returns"));
    }
}
