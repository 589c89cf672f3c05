//! Tag archive: a JSON record of each track's original and corrected tags.
//!
//! ```json
//! {
//!   "/music/.../01 - Track.flac": {
//!     "original":  { "timestamp": "2024-05-01T10:00:00+00:00", "tags": { "title": "..." } },
//!     "corrected": { "timestamp": "2024-05-02T09:30:00+00:00", "tags": { "work": "..." } }
//!   }
//! }
//! ```
//!
//! The original snapshot is taken once and never replaced. A correction is
//! only recorded for a track whose original is already archived.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ArchiveResult;
use crate::models::TagMap;

/// Tags at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSnapshot {
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub tags: TagMap,
}

impl TagSnapshot {
    fn now(tags: &TagMap) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            tags: tags.clone(),
        }
    }
}

/// Archived history of one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub original: TagSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<TagSnapshot>,
}

/// Archive persisted to a single JSON file.
#[derive(Debug)]
pub struct TagArchive {
    path: PathBuf,
    entries: BTreeMap<String, ArchiveEntry>,
}

impl TagArchive {
    /// Open an archive, loading the file if it exists.
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Archive file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, track_path: &str) -> Option<&ArchiveEntry> {
        self.entries.get(track_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a track's tags as first seen. Returns `false` (and changes
    /// nothing) if the track is already archived.
    pub fn store_original(&mut self, track_path: &str, tags: &TagMap) -> ArchiveResult<bool> {
        if self.entries.contains_key(track_path) {
            return Ok(false);
        }

        self.entries.insert(
            track_path.to_string(),
            ArchiveEntry {
                original: TagSnapshot::now(tags),
                corrected: None,
            },
        );
        self.save()?;
        Ok(true)
    }

    /// Record the tags written for a track. Returns `false` (and changes
    /// nothing) if the track has no archived original.
    pub fn store_correction(&mut self, track_path: &str, tags: &TagMap) -> ArchiveResult<bool> {
        let Some(entry) = self.entries.get_mut(track_path) else {
            return Ok(false);
        };

        entry.corrected = Some(TagSnapshot::now(tags));
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> ArchiveResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
