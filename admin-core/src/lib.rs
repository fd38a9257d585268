pub mod backend;
pub mod collection;
pub mod dashboard;
pub mod line_items;
pub mod models;
pub mod money;
pub mod normalize;

pub use backend::{AdminBackend, BackendError};
pub use collection::{CollectionAction, CollectionError, CollectionView, PageSizes, PageView, Searchable};
pub use line_items::{
    AggregatorConfig, Catalog, LineItem, LineItemEdit, LineItemError, LineItemIssue, LineItems,
    SoldQuantities, Totals, Variant,
};
pub use models::*;
pub use normalize::{FromRaw, RawRecord, RecordId};
