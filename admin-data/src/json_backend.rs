use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use admin_core::backend::{BackendConfig, BackendKind};
use admin_core::normalize::to_id;
use admin_core::{AdminBackend, BackendError, EntityKind};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

const VARIANTS_FILE: &str = "variants.json";
const ENVELOPE_KEY: &str = "data";

/// Opens the backend `config` names.
///
/// # Errors
///
/// [`BackendError::Configuration`] when the location is unusable.
pub async fn open_backend(config: &BackendConfig) -> Result<Box<dyn AdminBackend>, BackendError> {
    debug!(backend = %config.kind, location = %config.location.display(), "opening backend");
    match config.kind {
        BackendKind::Json => Ok(Box::new(JsonDirBackend::open(&config.location).await?)),
    }
}

/// How a collection file wraps its records. Rewrites keep the shape the
/// file was read in.
#[derive(Debug, Clone, PartialEq)]
enum FileShape {
    /// `[...]`
    Bare,
    /// `{"data": [...], ...}`; the other keys are kept as they were.
    Envelope(Map<String, Value>),
}

impl FileShape {
    fn wrap(
        self,
        records: Vec<Value>,
    ) -> Value {
        match self {
            Self::Bare => Value::Array(records),
            Self::Envelope(mut envelope) => {
                envelope.insert(ENVELOPE_KEY.to_string(), Value::Array(records));
                Value::Object(envelope)
            }
        }
    }
}

/// Backend over a directory of JSON exports: one `<collection>.json` file
/// per entity (`providers.json`, `purchases.json`, ...) plus
/// `variants.json` for the catalog.
///
/// Each file holds either a bare array of records or the REST envelope
/// `{"data": [...]}`. A missing file reads as an empty collection.
pub struct JsonDirBackend {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Like [`JsonDirBackend::new`], but `dir` must be an existing directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let dir = dir.into();
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(BackendError::Configuration(format!(
                "data directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(
        &self,
        kind: EntityKind,
    ) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }

    async fn read_collection(
        &self,
        path: &Path,
    ) -> Result<(Vec<Value>, FileShape), BackendError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "collection file missing; treating as empty");
                return Ok((Vec::new(), FileShape::Bare));
            }
            Err(e) => {
                return Err(BackendError::Io(format!(
                    "cannot read '{}': {e}",
                    path.display()
                )));
            }
        };

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| BackendError::Format(format!("'{}': {e}", path.display())))?;

        match body {
            Value::Array(records) => Ok((records, FileShape::Bare)),
            Value::Object(mut envelope) => match envelope.remove(ENVELOPE_KEY) {
                Some(Value::Array(records)) => Ok((records, FileShape::Envelope(envelope))),
                _ => Err(BackendError::Format(format!(
                    "'{}': expected an array or an object with a 'data' array",
                    path.display()
                ))),
            },
            _ => Err(BackendError::Format(format!(
                "'{}': expected an array of records",
                path.display()
            ))),
        }
    }

    /// Writes `body` next to `path` and renames it into place, so a failed
    /// write leaves the previous file intact.
    async fn replace_file(
        path: &Path,
        body: &Value,
    ) -> Result<(), BackendError> {
        let text = serde_json::to_string_pretty(body)
            .map_err(|e| BackendError::Format(e.to_string()))?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, text)
            .await
            .map_err(|e| BackendError::Io(format!("cannot write '{}': {e}", staging.display())))?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(BackendError::Io(format!(
                "cannot replace '{}': {e}",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for JsonDirBackend {
    async fn list(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<Value>, BackendError> {
        let (records, _) = self.read_collection(&self.collection_path(kind)).await?;
        Ok(records)
    }

    async fn list_variants(&self) -> Result<Vec<Value>, BackendError> {
        let (records, _) = self.read_collection(&self.dir.join(VARIANTS_FILE)).await?;
        Ok(records)
    }

    /// Appends `payload` to the collection file, assigning the next id when
    /// the payload has none.
    async fn submit(
        &self,
        kind: EntityKind,
        payload: Value,
    ) -> Result<Value, BackendError> {
        let Value::Object(mut record) = payload else {
            return Err(BackendError::Format("submitted payload must be an object".to_string()));
        };

        let _guard = self.write_lock.lock().await;
        let path = self.collection_path(kind);
        let (mut records, shape) = self.read_collection(&path).await?;

        let has_id = record.get("id").is_some_and(|id| to_id(id) != 0);
        if !has_id {
            let next_id = records
                .iter()
                .filter_map(|r| r.get("id"))
                .map(to_id)
                .max()
                .unwrap_or(0)
                .saturating_add(1);
            record.insert("id".to_string(), Value::from(next_id));
        }

        let saved = Value::Object(record);
        records.push(saved.clone());
        Self::replace_file(&path, &shape.wrap(records)).await?;

        info!(entity = %kind, id = %saved["id"], "record submitted");
        Ok(saved)
    }
}
