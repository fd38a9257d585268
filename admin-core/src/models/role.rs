use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId, to_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

impl FromRaw for Role {
    fn from_raw(raw: &RawRecord) -> Self {
        // Permissions arrive either as names or as nested permission objects.
        let permissions = match raw.field("permissions") {
            Value::Array(entries) => entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(map) => map.text("name"),
                    other => to_text(other),
                })
                .filter(|name| !name.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: raw.id("id"),
            name: raw.text("name"),
            description: raw.text("description"),
            permissions,
        }
    }
}

impl Searchable for Role {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.description.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: RecordId,
    pub name: String,
    pub description: String,
}

impl FromRaw for Permission {
    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            id: raw.id("id"),
            name: raw.text("name"),
            description: raw.text("description"),
        }
    }
}

impl Searchable for Permission {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.description.as_str()),
        ]
    }
}
