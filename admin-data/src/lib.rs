mod catalog_loader;
mod json_backend;

pub use catalog_loader::{CatalogLoader, CatalogLoaderError, VariantRecord};
pub use json_backend::{JsonDirBackend, open_backend};
