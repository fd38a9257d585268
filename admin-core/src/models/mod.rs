mod client;
mod entity_kind;
mod product;
mod provider;
mod purchase;
mod role;
mod sale;
mod sale_return;
mod user;

use std::borrow::Cow;

use chrono::NaiveDate;

pub use client::Client;
pub use entity_kind::EntityKind;
pub use product::Product;
pub use provider::Provider;
pub use purchase::Purchase;
pub use role::{Permission, Role};
pub use sale::{Sale, SaleLine};
pub use sale_return::SaleReturn;
pub use user::User;

/// Projects a date the two ways users type it in the search box:
/// `2024-03-09` and `09/03/2024`.
pub(crate) fn date_search_fields<'a>(date: Option<NaiveDate>) -> Vec<Cow<'a, str>> {
    match date {
        Some(d) => vec![
            Cow::Owned(d.format("%Y-%m-%d").to_string()),
            Cow::Owned(d.format("%d/%m/%Y").to_string()),
        ],
        None => Vec::new(),
    }
}
