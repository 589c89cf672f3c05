//! Domain models for the tagging pipeline.
//!
//! - [`TitleFields`] - the eight fields decoded from one title string
//! - [`AlbumFields`] - album, year and performers decoded from a folder name
//! - [`TrackRecord`] - one row of the review sheet (every column of a track)
//! - [`TagMap`] - tag name to single value, as read from or written to a file
//! - [`FieldSource`] - where a resolved value came from
//! - [`FailedTrack`] - a record with the reason it failed

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Tag names
// =============================================================================

/// Lower-case tag names understood by the resolver.
///
/// Names with spaces or `#` are the ones this tool writes itself; the rest are
/// the common Vorbis comment names.
pub mod tag_keys {
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const COMPOSER: &str = "composer";
    pub const GENRE: &str = "genre";
    pub const ALBUM: &str = "album";
    pub const YEAR_RECORDED: &str = "year recorded";
    pub const YEAR: &str = "year";
    pub const DATE: &str = "date";
    pub const ORCHESTRA: &str = "orchestra";
    pub const CONDUCTOR: &str = "conductor";
    pub const SOLOISTS: &str = "soloists";
    pub const ARRANGER: &str = "arranger";
    pub const DISC_NUMBER: &str = "discnumber";
    pub const TRACK_NUMBER: &str = "tracknumber";
    pub const TRACK_TITLE: &str = "tracktitle";
    pub const WORK: &str = "work";
    pub const WORK_NUMBER: &str = "work number";
    pub const INITIAL_KEY: &str = "initialkey";
    pub const CATALOG_NUMBER: &str = "catalog #";
    pub const OPUS: &str = "opus";
    pub const OPUS_NUMBER: &str = "opus number";
    pub const EPITHET: &str = "epithet";
    pub const MOVEMENT: &str = "movement";
}

/// Review sheet column headers, in sheet order.
pub mod columns {
    pub const PATH: &str = "Path";
    pub const COMPOSER: &str = "Composer";
    pub const ALBUM: &str = "Album";
    pub const YEAR_RECORDED: &str = "Year Recorded";
    pub const ORCHESTRA: &str = "Orchestra";
    pub const CONDUCTOR: &str = "Conductor";
    pub const SOLOISTS: &str = "Soloists";
    pub const ARRANGER: &str = "Arranger";
    pub const GENRE: &str = "Genre";
    pub const DISC_NUMBER: &str = "DiscNumber";
    pub const TRACK_NUMBER: &str = "TrackNumber";
    pub const TITLE: &str = "Title";
    pub const TRACK_TITLE: &str = "TrackTitle";
    pub const WORK: &str = "Work";
    pub const WORK_NUMBER: &str = "Work Number";
    pub const INITIAL_KEY: &str = "InitialKey";
    pub const CATALOG_NUMBER: &str = "Catalog #";
    pub const OPUS: &str = "Opus";
    pub const OPUS_NUMBER: &str = "Opus Number";
    pub const EPITHET: &str = "Epithet";
    pub const MOVEMENT: &str = "Movement";

    /// Every column, in sheet order.
    pub const ALL: [&str; 21] = [
        PATH, COMPOSER, ALBUM, YEAR_RECORDED, ORCHESTRA, CONDUCTOR, SOLOISTS,
        ARRANGER, GENRE, DISC_NUMBER, TRACK_NUMBER, TITLE, TRACK_TITLE, WORK,
        WORK_NUMBER, INITIAL_KEY, CATALOG_NUMBER, OPUS, OPUS_NUMBER, EPITHET,
        MOVEMENT,
    ];
}

// =============================================================================
// Title Fields
// =============================================================================

/// Fields decoded from a single title such as
/// `Symphony No 41 in C, 'Jupiter', K 551 - I. Allegro vivace`.
///
/// Only `work` is always present. Values are built once and replaced, never
/// edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleFields {
    /// What remains after every other field is stripped.
    pub work: String,
    /// `No 75`
    pub work_number: Option<String>,
    /// `G`, `C minor`, `E-flat`
    pub initial_key: Option<String>,
    /// `Hob.III:75`, `K 551`
    pub catalog_number: Option<String>,
    /// `Op 76`
    pub opus: Option<String>,
    /// `No 1`, qualifying the opus.
    pub opus_number: Option<String>,
    /// Nickname without its quotes, e.g. `Jupiter`.
    pub epithet: Option<String>,
    /// Roman-numeral-prefixed movement, e.g. `I. Allegro vivace`.
    pub movement: Option<String>,
}

impl TitleFields {
    /// A title with only a work.
    pub fn new(work: impl Into<String>) -> Self {
        Self {
            work: work.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Album Fields
// =============================================================================

/// Album-level fields, decoded from an `[YYYY] Album (Performers)` folder name
/// or read from tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumFields {
    pub album: Option<String>,
    /// Four-digit year, kept as text.
    pub year_recorded: Option<String>,
    pub orchestra: Option<String>,
    pub conductor: Option<String>,
}

// =============================================================================
// Provenance
// =============================================================================

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// Decoded from the folder structure or file name.
    Path,
    /// Decoded from the free-text title tag.
    Title,
    /// Read as-is from a named tag.
    Tag,
}

// =============================================================================
// Track Record (review sheet row)
// =============================================================================

/// Every column of one track, as shown in the review sheet.
///
/// Field order is column order. Empty cells read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Composer")]
    pub composer: Option<String>,
    #[serde(rename = "Album")]
    pub album: Option<String>,
    #[serde(rename = "Year Recorded")]
    pub year_recorded: Option<String>,
    #[serde(rename = "Orchestra")]
    pub orchestra: Option<String>,
    #[serde(rename = "Conductor")]
    pub conductor: Option<String>,
    #[serde(rename = "Soloists")]
    pub soloists: Option<String>,
    #[serde(rename = "Arranger")]
    pub arranger: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "DiscNumber")]
    pub disc_number: Option<String>,
    #[serde(rename = "TrackNumber")]
    pub track_number: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "TrackTitle")]
    pub track_title: Option<String>,
    #[serde(rename = "Work")]
    pub work: Option<String>,
    #[serde(rename = "Work Number")]
    pub work_number: Option<String>,
    #[serde(rename = "InitialKey")]
    pub initial_key: Option<String>,
    #[serde(rename = "Catalog #")]
    pub catalog_number: Option<String>,
    #[serde(rename = "Opus")]
    pub opus: Option<String>,
    #[serde(rename = "Opus Number")]
    pub opus_number: Option<String>,
    #[serde(rename = "Epithet")]
    pub epithet: Option<String>,
    #[serde(rename = "Movement")]
    pub movement: Option<String>,

    /// Column name -> origin of the value. Not part of the sheet.
    #[serde(skip)]
    pub provenance: BTreeMap<String, FieldSource>,
}

impl TrackRecord {
    /// An empty record for a track path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The title-derived columns as a [`TitleFields`] value.
    ///
    /// A missing work becomes the empty string.
    pub fn title_fields(&self) -> TitleFields {
        TitleFields {
            work: self.work.clone().unwrap_or_default(),
            work_number: self.work_number.clone(),
            initial_key: self.initial_key.clone(),
            catalog_number: self.catalog_number.clone(),
            opus: self.opus.clone(),
            opus_number: self.opus_number.clone(),
            epithet: self.epithet.clone(),
            movement: self.movement.clone(),
        }
    }

    /// Every column except `Path`, in sheet order, with blank cells dropped.
    pub fn tag_columns(&self) -> Vec<(&'static str, &str)> {
        let cells = [
            (columns::COMPOSER, &self.composer),
            (columns::ALBUM, &self.album),
            (columns::YEAR_RECORDED, &self.year_recorded),
            (columns::ORCHESTRA, &self.orchestra),
            (columns::CONDUCTOR, &self.conductor),
            (columns::SOLOISTS, &self.soloists),
            (columns::ARRANGER, &self.arranger),
            (columns::GENRE, &self.genre),
            (columns::DISC_NUMBER, &self.disc_number),
            (columns::TRACK_NUMBER, &self.track_number),
            (columns::TITLE, &self.title),
            (columns::TRACK_TITLE, &self.track_title),
            (columns::WORK, &self.work),
            (columns::WORK_NUMBER, &self.work_number),
            (columns::INITIAL_KEY, &self.initial_key),
            (columns::CATALOG_NUMBER, &self.catalog_number),
            (columns::OPUS, &self.opus),
            (columns::OPUS_NUMBER, &self.opus_number),
            (columns::EPITHET, &self.epithet),
            (columns::MOVEMENT, &self.movement),
        ];

        cells
            .into_iter()
            .filter_map(|(column, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (column, v))
            })
            .collect()
    }

    /// Origin of a column's value, if it has one.
    pub fn source_of(&self, column: &str) -> Option<FieldSource> {
        self.provenance.get(column).copied()
    }
}

/// A track that could not be read or written, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTrack {
    pub record: TrackRecord,
    pub reason: String,
}

impl FailedTrack {
    pub fn new(record: TrackRecord, reason: impl Into<String>) -> Self {
        Self { record, reason: reason.into() }
    }
}

// =============================================================================
// Tag Map
// =============================================================================

/// Tag name -> single value.
///
/// Names are case-insensitive (stored lower-case). Blank values are treated
/// as absent on lookup. Building from an iterator keeps the first value of a
/// repeated name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag, replacing any previous value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    /// Value of a tag, if present and not blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(&key.to_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value of the first present tag among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Whether a non-blank tag exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (key, value) in iter {
            map.entry(key.as_ref().to_lowercase())
                .or_insert_with(|| value.into());
        }
        Self(map)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_map_is_case_insensitive() {
        let tags: TagMap = [("TITLE", "Prelude"), ("Genre", "Baroque")]
            .into_iter()
            .collect();
        assert_eq!(tags.get("title"), Some("Prelude"));
        assert_eq!(tags.get("GENRE"), Some("Baroque"));
    }

    #[test]
    fn test_tag_map_keeps_first_repeated_value() {
        let tags: TagMap = [("artist", "Bach"), ("ARTIST", "Handel")]
            .into_iter()
            .collect();
        assert_eq!(tags.get("artist"), Some("Bach"));
    }

    #[test]
    fn test_tag_map_blank_is_absent() {
        let tags: TagMap = [("opus", "  ")].into_iter().collect();
        assert!(!tags.contains("opus"));
        assert_eq!(tags.first_of(&["opus", "missing"]), None);
    }

    #[test]
    fn test_tag_columns_skip_blank_cells() {
        let mut record = TrackRecord::new("/music/01 - Prelude.flac");
        record.work = Some("Prelude".into());
        record.opus = Some("".into());
        record.genre = Some("Baroque".into());

        let cells = record.tag_columns();
        assert_eq!(cells, vec![(columns::GENRE, "Baroque"), (columns::WORK, "Prelude")]);
    }

    #[test]
    fn test_title_fields_from_record() {
        let mut record = TrackRecord::new("x.flac");
        record.work = Some("Symphony".into());
        record.opus = Some("Op 55".into());

        let fields = record.title_fields();
        assert_eq!(fields.work, "Symphony");
        assert_eq!(fields.opus.as_deref(), Some("Op 55"));
        assert!(fields.movement.is_none());
    }

    #[test]
    fn test_title_fields_serialization() {
        let fields = TitleFields {
            work_number: Some("No 41".into()),
            ..TitleFields::new("Symphony")
        };
        let json = serde_json::to_string(&fields).unwrap();
        assert!(json.contains("\"workNumber\":\"No 41\""));
    }
}
