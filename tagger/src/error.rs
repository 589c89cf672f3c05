//! Error types for the tagging pipeline.
//!
//! One error enum per concern, composed into [`PipelineError`]:
//!
//! - [`ParseError`] - title parsing and composition errors
//! - [`TagError`] - audio tag read/write errors
//! - [`SheetError`] - review sheet (CSV) errors
//! - [`ArchiveError`] - tag archive errors
//! - [`ValidationError`] - corrected record validation errors
//! - [`ConfigError`] - environment configuration errors
//! - [`PipelineError`] - top-level read/write orchestration errors
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors from the title parser and composer.
///
/// A field that simply does not match is not an error: it comes back as `None`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input has no usable text at all.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// An opus number was given without the opus it qualifies.
    #[error("Opus number '{0}' has no opus")]
    OrphanOpusNumber(String),
}

// =============================================================================
// Tag Errors
// =============================================================================

/// Errors while reading or writing audio tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// Failed to open or rename the file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// The tag library rejected the file.
    #[error("Failed to read tags: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    /// File type we do not write tags for.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

// =============================================================================
// Sheet Errors
// =============================================================================

/// Errors while writing or reading the review sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read or write the file.
    #[error("Failed to access sheet: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("Invalid sheet: {0}")]
    Csv(#[from] csv::Error),

    /// Content could not be decoded.
    #[error("Failed to decode sheet: {0}")]
    EncodingError(String),

    /// No header row.
    #[error("Sheet is empty")]
    EmptySheet,

    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// Archive Errors
// =============================================================================

/// Errors from the tag archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error.
    #[error("Archive IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Archive JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during corrected record validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid field value.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors for the read and write flows.
///
/// Per-track failures are not raised through this type; they are collected
/// in the pipeline reports so that one bad track never stops a batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Title parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Tag error.
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    /// Review sheet error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO error outside tag and sheet handling.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("Failed to scan library: {0}")]
    Walk(#[from] walkdir::Error),

    /// The scanned directory holds no audio files.
    #[error("No audio files found in {}", .0.display())]
    NoTracks(PathBuf),

    /// Command-line input rejected before any work started.
    #[error("{0}")]
    InvalidInput(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for tag operations.
pub type TagResult<T> = Result<T, TagError>;

/// Result type for sheet operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
