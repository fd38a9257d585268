use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

/// A supplier that purchases are placed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: RecordId,
    pub name: String,
    pub document: String,
    pub email: String,
    pub phone: String,
    pub status: String,
}

impl FromRaw for Provider {
    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            id: raw.id("id"),
            name: raw.text_any(&["name", "company_name"]),
            document: raw.text_any(&["document", "document_number", "tax_id"]),
            email: raw.text("email"),
            phone: raw.text("phone"),
            status: raw.text("status"),
        }
    }
}

impl Searchable for Provider {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.document.as_str()),
            Cow::from(self.email.as_str()),
            Cow::from(self.status.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn from_raw_falls_back_to_alternate_keys() {
        let provider = Provider::from_value(&json!({
            "id": 9,
            "company_name": "Acme Textiles",
            "tax_id": "900123",
            "status": "Active"
        }));

        assert_eq!(provider.name, "Acme Textiles");
        assert_eq!(provider.document, "900123");
        assert!(provider.matches("active"));
        assert!(!provider.matches("phone"));
    }
}
