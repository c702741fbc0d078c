//! Persistence gateway for the committed venue collection.
//!
//! The entire collection lives in one serialized JSON array under one fixed
//! path — the local-first analogue of a single browser-storage key. There is
//! no versioning field and no migration path; corruption on load is treated
//! as "no data", never as a fatal error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use hopmap_core::Venue;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The load/save contract the application core depends on. Implementations
/// are the only place venue data touches durable storage.
#[allow(async_fn_in_trait)]
pub trait VenueStore {
    /// Loads the committed collection. Absent or corrupt data is "empty",
    /// not an error.
    async fn load(&self) -> Result<Vec<Venue>, StoreError>;

    /// Replaces the persisted collection. Last write wins.
    async fn save(&self, venues: &[Venue]) -> Result<(), StoreError>;
}

/// JSON-file-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VenueStore for FileStore {
    async fn load(&self) -> Result<Vec<Venue>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        match serde_json::from_slice::<Vec<Venue>>(&bytes) {
            Ok(venues) => Ok(venues),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stored venue blob is corrupt; starting from an empty collection"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, venues: &[Venue]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash mid-write never corrupts the blob.
        let json = serde_json::to_vec_pretty(venues)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
