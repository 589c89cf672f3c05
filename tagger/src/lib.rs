//! # Classical Tagger - title parsing and tag correction for classical libraries
//!
//! Classical recordings carry their metadata in loosely formatted strings: a
//! folder such as `[1971] Concerti Grossi (Munchener Bach-Orchester with Karl Richter)`
//! and a title such as `Symphony No 41 in C, 'Jupiter', K 551 - I. Allegro vivace`.
//! This crate decodes those strings into fields, lets a human review them in a
//! CSV sheet, and writes the corrected fields back as tags.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐     ┌────────────┐
//! │  FLAC tags │────▶│  Parsers   │────▶│  Resolver  │────▶│ Review CSV │
//! │  + paths   │     │ (title/alb)│     │ (coalesce) │     │  (human)   │
//! └────────────┘     └────────────┘     └────────────┘     └─────┬──────┘
//!                                                                │
//! ┌────────────┐     ┌────────────┐     ┌────────────┐           │
//! │ FLAC tags  │◀────│  Composer  │◀────│ Validation │◀──────────┘
//! │ + rename   │     │  (title)   │     │  (schema)  │
//! └────────────┘     └────────────┘     └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use classical_tagger::{compose_title, extract_title};
//!
//! let fields = extract_title("Symphony No 41 in C, 'Jupiter', K 551 - I. Allegro vivace").unwrap();
//! assert_eq!(fields.work, "Symphony");
//! assert_eq!(fields.catalog_number.as_deref(), Some("K 551"));
//!
//! let title = compose_title(&fields).unwrap();
//! assert_eq!(title, "Symphony, No 41, K 551, in C, 'Jupiter' - I. Allegro vivace");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (TitleFields, AlbumFields, TrackRecord, TagMap)
//! - [`parser`] - Performer, album, path and title parsers
//! - [`compose`] - Canonical title and file name composition
//! - [`resolve`] - Per-track field resolution with provenance
//! - [`tags`] - Audio tag reading and writing
//! - [`sheet`] - Review sheet CSV
//! - [`validation`] - Track schema validation
//! - [`archive`] - Original/corrected tag archive
//! - [`pipeline`] - Batch read and write flows
//! - [`logs`] - Log entries and sinks
//! - [`config`] - Environment configuration

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod compose;
pub mod parser;
pub mod resolve;

// I/O collaborators
pub mod archive;
pub mod sheet;
pub mod tags;

// Validation
pub mod validation;

// Orchestration
pub mod config;
pub mod logs;
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ArchiveError, ConfigError, ParseError, PipelineError, PipelineResult, SheetError, TagError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{AlbumFields, FailedTrack, FieldSource, TagMap, TitleFields, TrackRecord};

// =============================================================================
// Re-exports - Parsing and composition
// =============================================================================

pub use compose::{compose_title, sanitize_filename, suggested_stem};
pub use parser::{
    album_segment, disc_number, extract_title, parse_album, parse_performer, track_number,
};
pub use resolve::{resolve_album, resolve_title, resolve_track};

// =============================================================================
// Re-exports - Tags, sheet, archive
// =============================================================================

pub use archive::{ArchiveEntry, TagArchive, TagSnapshot};
pub use sheet::{read_sheet, write_failure_sheet, write_sheet, Sheet};
pub use tags::{tags_for_record, FlacTagStore, MemoryTagStore, TagStore};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_record, validate_record};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    check_read_inputs, check_write_inputs, read_library, renamed_path, scan_library,
    write_library, ReadOptions, ReadReport, WriteOptions, WriteReport, WrittenTrack,
};

// =============================================================================
// Re-exports - Logging and config
// =============================================================================

pub use config::TaggerConfig;
pub use logs::{ConsoleSink, FileSink, LogEntry, LogLevel, LogSink, MultiSink, NullSink};
