//! Storage for the last detected region.
//!
//! A detected region code is remembered with the time it was detected so the
//! next lookup can skip geolocation while the value is still fresh.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rumahsubsidi_core::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// A remembered region detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRegion {
    pub code: String,
    pub name: String,
    pub detected_at: DateTime<Utc>,
}

impl StoredRegion {
    pub fn now(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into(), detected_at: Utc::now() }
    }

    /// Younger than `max_age` at `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.detected_at) < max_age
    }
}

/// Key/value slot holding the last detected region.
#[async_trait]
pub trait RegionStore: Send + Sync {
    /// The stored region, if any. Unreadable state reads as `None`.
    async fn load(&self) -> Option<StoredRegion>;

    async fn save(&self, region: &StoredRegion) -> Result<(), Error>;

    async fn clear(&self) -> Result<(), Error>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryRegionStore {
    slot: RwLock<Option<StoredRegion>>,
}

impl MemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(region: StoredRegion) -> Self {
        Self { slot: RwLock::new(Some(region)) }
    }
}

#[async_trait]
impl RegionStore for MemoryRegionStore {
    async fn load(&self) -> Option<StoredRegion> {
        self.slot.read().await.clone()
    }

    async fn save(&self, region: &StoredRegion) -> Result<(), Error> {
        *self.slot.write().await = Some(region.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileRegionStore {
    path: PathBuf,
}

impl FileRegionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RegionStore for FileRegionStore {
    async fn load(&self) -> Option<StoredRegion> {
        let content = tokio::fs::read_to_string(&self.path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(region) => Some(region),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable region file");
                None
            }
        }
    }

    async fn save(&self, region: &StoredRegion) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Internal(format!("failed to create {}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(region)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| Error::Internal(format!("failed to write {}: {e}", self.path.display())))
    }

    async fn clear(&self) -> Result<(), Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Internal(format!("failed to remove {}: {e}", self.path.display()))),
        }
    }
}
