use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::collection::Searchable;
use crate::normalize::{FromRaw, RawFields, RawRecord, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role_name: String,
    pub active: bool,
}

impl User {
    pub fn status_label(&self) -> &'static str {
        if self.active { "active" } else { "inactive" }
    }
}

impl FromRaw for User {
    fn from_raw(raw: &RawRecord) -> Self {
        let active = if raw.field("active").is_null() {
            !raw.field("status").is_null() && raw.flag("status")
        } else {
            raw.flag("active")
        };
        Self {
            id: raw.id("id"),
            name: raw.text_any(&["name", "username"]),
            email: raw.text("email"),
            role_name: raw.text_any(&["role.name", "role_name", "role"]),
            active,
        }
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::from(self.name.as_str()),
            Cow::from(self.email.as_str()),
            Cow::from(self.role_name.as_str()),
            Cow::from(self.status_label()),
        ]
    }
}
