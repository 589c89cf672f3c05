//! Audio tag collaborator.
//!
//! The pipeline talks to a [`TagStore`]; [`FlacTagStore`] reads and writes
//! Vorbis comments in FLAC files through lofty. [`MemoryTagStore`] keeps tags
//! in memory for tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::ogg::VorbisComments;
use lofty::tag::TagType;

use crate::error::{TagError, TagResult};
use crate::models::{columns, tag_keys, TagMap, TrackRecord};

/// Reads and replaces the tags of one audio file.
pub trait TagStore: Send + Sync {
    /// Every tag of the file. Repeated names keep their first value.
    fn read(&self, path: &Path) -> TagResult<TagMap>;

    /// Replace every tag of the file with `tags`.
    fn write(&self, path: &Path, tags: &TagMap) -> TagResult<()>;

    /// Drop tag formats other than the primary one. Returns whether anything
    /// was removed.
    fn remove_stray_tags(&self, _path: &Path) -> TagResult<bool> {
        Ok(false)
    }
}

// =============================================================================
// FLAC
// =============================================================================

/// Vorbis comments in FLAC files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlacTagStore;

impl FlacTagStore {
    fn open(path: &Path) -> TagResult<FlacFile> {
        let is_flac = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("flac"));
        if !is_flac {
            return Err(TagError::UnsupportedFormat(path.display().to_string()));
        }

        let mut file = File::open(path)?;
        Ok(FlacFile::read_from(&mut file, ParseOptions::new())?)
    }
}

impl TagStore for FlacTagStore {
    fn read(&self, path: &Path) -> TagResult<TagMap> {
        let flac = Self::open(path)?;
        Ok(flac
            .vorbis_comments()
            .map(|comments| comments.items().collect())
            .unwrap_or_default())
    }

    fn write(&self, path: &Path, tags: &TagMap) -> TagResult<()> {
        let mut flac = Self::open(path)?;

        let mut comments = VorbisComments::default();
        if let Some(existing) = flac.vorbis_comments() {
            comments.set_vendor(existing.vendor().to_string());
        }
        for (key, value) in tags.iter() {
            comments.insert(key.to_uppercase(), value.to_string());
        }

        // Saved through the file so its PICTURE blocks are written back
        flac.set_vorbis_comments(comments);
        flac.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }

    fn remove_stray_tags(&self, path: &Path) -> TagResult<bool> {
        let flac = Self::open(path)?;
        if !flac.contains_tag_type(TagType::Id3v2) {
            return Ok(false);
        }
        TagType::Id3v2.remove_from_path(path)?;
        Ok(true)
    }
}

// =============================================================================
// In memory
// =============================================================================

/// Tags held in memory, keyed by path. Any extension is accepted.
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    files: Mutex<BTreeMap<PathBuf, TagMap>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file's tags.
    pub fn with_file(self, path: impl Into<PathBuf>, tags: TagMap) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), tags);
        }
        self
    }

    /// Current tags of a file, if known.
    pub fn tags_of(&self, path: &Path) -> Option<TagMap> {
        self.files.lock().ok()?.get(path).cloned()
    }
}

impl TagStore for MemoryTagStore {
    fn read(&self, path: &Path) -> TagResult<TagMap> {
        self.tags_of(path).ok_or_else(|| {
            TagError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no tags stored for {}", path.display()),
            ))
        })
    }

    fn write(&self, path: &Path, tags: &TagMap) -> TagResult<()> {
        let mut files = self.files.lock().map_err(|_| {
            TagError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "tag store lock poisoned",
            ))
        })?;
        files.insert(path.to_path_buf(), tags.clone());
        Ok(())
    }
}

// =============================================================================
// Record -> tags
// =============================================================================

/// The tags written for a corrected record.
///
/// Every non-blank column becomes a tag named after it; `title` holds the
/// composed title and `date` repeats the recording year.
pub fn tags_for_record(record: &TrackRecord, composed_title: &str) -> TagMap {
    let mut tags = TagMap::new();
    for (column, value) in record.tag_columns() {
        tags.insert(column, value);
    }
    tags.insert(columns::TITLE, composed_title);
    if let Some(year) = record.year_recorded.as_deref().map(str::trim).filter(|y| !y.is_empty()) {
        tags.insert(tag_keys::DATE, year);
    }
    tags
}
