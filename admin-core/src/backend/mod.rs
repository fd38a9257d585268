pub mod repository;
pub mod source;

pub use repository::{AdminBackend, BackendError};
pub use source::{BackendConfig, BackendKind};

use tracing::debug;

use crate::collection::{CollectionView, Searchable};
use crate::line_items::Catalog;
use crate::models::EntityKind;
use crate::normalize::FromRaw;

/// Fetches `kind` from the backend and replaces `view`'s collection with it.
/// Returns the number of records loaded.
///
/// # Errors
///
/// Whatever the backend returns; `view` is left untouched on error.
pub async fn reload<T>(
    backend: &dyn AdminBackend,
    kind: EntityKind,
    view: &mut CollectionView<T>,
) -> Result<usize, BackendError>
where
    T: FromRaw + Searchable,
{
    let raw = backend.list(kind).await?;
    let loaded = view.load(&raw);
    debug!(entity = %kind, loaded, "collection reloaded");
    Ok(loaded)
}

/// Fetches the variant catalog used by document forms.
///
/// # Errors
///
/// Whatever the backend returns.
pub async fn fetch_catalog(backend: &dyn AdminBackend) -> Result<Catalog, BackendError> {
    let raw = backend.list_variants().await?;
    Ok(Catalog::from_raw_records(&raw))
}
