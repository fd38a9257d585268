use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    pub document: String,
    pub email: String,
    pub phone: String,
}

impl FromRaw for Client {
    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            id: raw.id("id"),
            name: raw.text("name"),
            document: raw.text_any(&["document", "document_number"]),
            email: raw.text("email"),
            phone: raw.text("phone"),
        }
    }
}

impl Searchable for Client {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.document.as_str()),
            Cow::from(self.email.as_str()),
            Cow::from(self.phone.as_str()),
        ]
    }
}
