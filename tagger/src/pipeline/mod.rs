//! Batch flows around the parsing core.
//!
//! ```text
//! read:  library dir ──▶ scan ──▶ read tags ──▶ resolve (parallel) ──▶ ReadReport
//!                                                     └──▶ archive originals
//! write: review sheet ──▶ validate ──▶ compose title ──▶ write tags ──▶ rename ──▶ WriteReport
//!                                                     └──▶ archive corrections
//! ```
//!
//! A track that fails is collected with its reason and the batch carries on.
//! Only problems that affect the whole batch (an unreadable directory, an
//! archive that cannot be saved) are returned as errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use classical_tagger::{read_library, ConsoleSink, FlacTagStore, ReadOptions};
//!
//! let report = read_library("/music/Classical", &FlacTagStore, &ReadOptions::default(), None, &ConsoleSink)?;
//! println!("{} tracks, {} failed", report.records.len(), report.failed.len());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::archive::TagArchive;
use crate::compose::{compose_title, suggested_stem};
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{LogEntry, LogSink};
use crate::models::{FailedTrack, TagMap, TrackRecord};
use crate::resolve::resolve_track;
use crate::tags::{tags_for_record, TagStore};
use crate::validation::validate_record;

// =============================================================================
// Options and reports
// =============================================================================

/// Options for the read flow
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Audio extensions to scan for, lower-case, without the dot
    pub extensions: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["flac".to_string()],
        }
    }
}

/// Options for the write flow
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Check each record against the track schema first
    pub validate: bool,
    /// Rename files to `<TrackNumber> - <title>.<ext>`
    pub rename: bool,
    /// Compute everything, change nothing on disk
    pub dry_run: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            validate: true,
            rename: true,
            dry_run: false,
        }
    }
}

/// Result of the read flow
#[derive(Debug, Clone, Default)]
pub struct ReadReport {
    /// One row per readable track, in path order
    pub records: Vec<TrackRecord>,
    pub failed: Vec<FailedTrack>,
}

/// A track whose tags were written
#[derive(Debug, Clone)]
pub struct WrittenTrack {
    pub record: TrackRecord,
    /// Composed canonical title
    pub title: String,
    /// Tags written (or that would be written on a dry run)
    pub tags: TagMap,
    /// Location after renaming
    pub final_path: PathBuf,
}

/// Result of the write flow
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub successful: Vec<WrittenTrack>,
    pub failed: Vec<FailedTrack>,
}

// =============================================================================
// Input checks
// =============================================================================

fn check_output(output: &Path) -> PipelineResult<()> {
    let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(dir) if !dir.is_dir() => Err(PipelineError::InvalidInput(format!(
            "Output directory does not exist: {}",
            dir.display()
        ))),
        _ if output.is_dir() => Err(PipelineError::InvalidInput(format!(
            "Output path is a directory: {}",
            output.display()
        ))),
        _ => Ok(()),
    }
}

/// Read mode needs an existing library directory and a writable output location.
pub fn check_read_inputs(library: &Path, output: &Path) -> PipelineResult<()> {
    if !library.is_dir() {
        return Err(PipelineError::InvalidInput(format!(
            "Library directory does not exist: {}",
            library.display()
        )));
    }
    check_output(output)
}

/// Write mode needs an existing review sheet and a writable output location.
pub fn check_write_inputs(sheet: &Path, output: &Path) -> PipelineResult<()> {
    if !sheet.is_file() {
        return Err(PipelineError::InvalidInput(format!(
            "Review sheet does not exist: {}",
            sheet.display()
        )));
    }
    if sheet == output {
        return Err(PipelineError::InvalidInput(
            "Output must differ from the review sheet".to_string(),
        ));
    }
    check_output(output)
}

// =============================================================================
// Read
// =============================================================================

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}

/// All audio files under `dir`, sorted.
pub fn scan_library(dir: impl AsRef<Path>, extensions: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut tracks = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            tracks.push(entry.into_path());
        }
    }

    if tracks.is_empty() {
        return Err(PipelineError::NoTracks(dir.to_path_buf()));
    }

    tracks.sort();
    Ok(tracks)
}

/// Read and resolve one track.
fn read_track(path: &Path, store: &dyn TagStore) -> Result<(TrackRecord, TagMap), FailedTrack> {
    let track_path = path.to_string_lossy().to_string();
    let fail = |reason: String| FailedTrack::new(TrackRecord::new(track_path.clone()), reason);

    let tags = store.read(path).map_err(|e| fail(e.to_string()))?;
    let record = resolve_track(&track_path, &tags).map_err(|e| fail(e.to_string()))?;
    Ok((record, tags))
}

/// Read every track under `dir` into review rows.
///
/// Tracks are resolved in parallel; the report keeps path order. With an
/// archive, each track's original tags are recorded after the parallel phase.
pub fn read_library(
    dir: impl AsRef<Path>,
    store: &dyn TagStore,
    options: &ReadOptions,
    archive: Option<&mut TagArchive>,
    log: &dyn LogSink,
) -> PipelineResult<ReadReport> {
    let paths = scan_library(dir, &options.extensions)?;
    log.log(LogEntry::info(format!("Processing {} files...", paths.len())));

    let results: Vec<Result<(TrackRecord, TagMap), FailedTrack>> = paths
        .par_iter()
        .map(|path| {
            let result = read_track(path, store);
            match &result {
                Ok(_) => log.log(LogEntry::success(path.display().to_string()).with_indent(1)),
                Err(failed) => log.log(
                    LogEntry::error(format!("{}: {}", failed.record.path, failed.reason)).with_indent(1),
                ),
            }
            result
        })
        .collect();

    let mut report = ReadReport::default();
    let mut originals = Vec::new();
    for result in results {
        match result {
            Ok((record, tags)) => {
                originals.push((record.path.clone(), tags));
                report.records.push(record);
            }
            Err(failed) => report.failed.push(failed),
        }
    }

    if let Some(archive) = archive {
        let mut stored = 0;
        for (path, tags) in &originals {
            if archive.store_original(path, tags)? {
                stored += 1;
            }
        }
        log.log(LogEntry::info(format!(
            "Archived original tags of {} tracks in {}",
            stored,
            archive.path().display()
        )));
    }

    log.log(LogEntry::success(format!("Successfully processed: {}", report.records.len())));
    if !report.failed.is_empty() {
        log.log(LogEntry::warning(format!("Failed: {}", report.failed.len())));
    }

    Ok(report)
}

// =============================================================================
// Write
// =============================================================================

/// Where a track ends up after renaming: same folder, same extension.
pub fn renamed_path(path: &Path, track_number: Option<&str>, title: &str) -> PathBuf {
    let stem = suggested_stem(track_number, title);
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };
    path.with_file_name(file_name)
}

/// A track that could not be fully written.
struct TrackFailure {
    reason: String,
    /// Tags already on disk when a later step failed
    written: Option<TagMap>,
}

impl From<String> for TrackFailure {
    fn from(reason: String) -> Self {
        Self {
            reason,
            written: None,
        }
    }
}

/// Validate, compose, write and rename one track.
fn write_track(
    record: &TrackRecord,
    store: &dyn TagStore,
    options: &WriteOptions,
    log: &dyn LogSink,
) -> Result<WrittenTrack, TrackFailure> {
    if options.validate {
        validate_record(record).map_err(|e| e.to_string())?;
    }

    let title = compose_title(&record.title_fields()).map_err(|e| e.to_string())?;
    let tags = tags_for_record(record, &title);
    let path = PathBuf::from(&record.path);

    let final_path = if options.rename {
        renamed_path(&path, record.track_number.as_deref(), &title)
    } else {
        path.clone()
    };

    if final_path != path && final_path.exists() {
        return Err(format!("refusing to overwrite {}", final_path.display()).into());
    }

    if !options.dry_run {
        store.write(&path, &tags).map_err(|e| e.to_string())?;

        match store.remove_stray_tags(&path) {
            Ok(true) => log.log(LogEntry::info("Removed ID3 tag").with_indent(2)),
            Ok(false) => {}
            Err(e) => log.log(
                LogEntry::warning(format!("Could not remove ID3 tag: {}", e)).with_indent(2),
            ),
        }

        if final_path != path {
            if let Err(e) = fs::rename(&path, &final_path) {
                return Err(TrackFailure {
                    reason: format!("tags written, but rename failed: {}", e),
                    written: Some(tags),
                });
            }
        }
    }

    Ok(WrittenTrack {
        record: record.clone(),
        title,
        tags,
        final_path,
    })
}

/// Write corrected records back to their files.
///
/// Records are processed in order, one at a time, so that two records never
/// race for the same new file name. With an archive (and not on a dry run),
/// each written track's new tags are recorded as its correction.
pub fn write_library(
    records: &[TrackRecord],
    store: &dyn TagStore,
    options: &WriteOptions,
    mut archive: Option<&mut TagArchive>,
    log: &dyn LogSink,
) -> PipelineResult<WriteReport> {
    log.log(LogEntry::info(format!("Writing tags for {} files...", records.len())));
    if options.dry_run {
        log.log(LogEntry::warning("Dry run: no file will be changed"));
    }

    let mut report = WriteReport::default();

    for record in records {
        match write_track(record, store, options, log) {
            Ok(written) => {
                log.log(LogEntry::success(written.final_path.display().to_string()).with_indent(1));
                if let (Some(archive), false) = (archive.as_deref_mut(), options.dry_run) {
                    archive.store_correction(&record.path, &written.tags)?;
                }
                report.successful.push(written);
            }
            Err(failure) => {
                if let (Some(archive), Some(tags)) = (archive.as_deref_mut(), &failure.written) {
                    archive.store_correction(&record.path, tags)?;
                }
                log.log(LogEntry::error(format!("{}: {}", record.path, failure.reason)).with_indent(1));
                report.failed.push(FailedTrack::new(record.clone(), failure.reason));
            }
        }
    }

    log.log(LogEntry::success(format!("Successfully processed: {}", report.successful.len())));
    if !report.failed.is_empty() {
        log.log(LogEntry::warning(format!("Failed: {}", report.failed.len())));
    }

    Ok(report)
}
