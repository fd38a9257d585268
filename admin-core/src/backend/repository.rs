use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::EntityKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Record not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed response: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The remote REST API as seen by the admin screens.
///
/// List methods return raw records after transport-level unwrapping
/// (status check, body parsing); normalization happens in the caller via
/// [`FromRaw`](crate::normalize::FromRaw). Retry and timeout policy belongs
/// to implementations.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// Every record of one entity collection.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, BackendError>;

    /// Product variants with prices and available quantities.
    async fn list_variants(&self) -> Result<Vec<Value>, BackendError>;

    /// Stores a new record and returns it as the backend saved it.
    async fn submit(
        &self,
        kind: EntityKind,
        payload: Value,
    ) -> Result<Value, BackendError>;
}
