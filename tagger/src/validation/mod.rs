//! JSON Schema validation of corrected review-sheet rows.
//!
//! Rows come back from a human editor, so every row is checked before its tags
//! are written. The schema (Draft 7) is embedded at compile time from
//! `schemas/track-record.json` and checks:
//!
//! - `Path` and `Work` present and non-empty
//! - `Year Recorded` four digits, disc and track numbers digits only
//! - `Work Number` / `Opus Number` as `No N`, `Opus` as `Op N`
//! - `Catalog #` ending in a digit, `InitialKey` a key name
//! - `Opus Number` only together with `Opus`
//!
//! # Example
//!
//! ```rust,ignore
//! use classical_tagger::{validate_record, TrackRecord};
//!
//! let mut record = TrackRecord::new("/music/01 - Prelude.flac");
//! record.work = Some("Prelude".into());
//! assert!(validate_record(&record).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::TrackRecord;

static TRACK_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/track-record.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// Returns every violation, not just the first.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// JSON form of a record with empty cells left out.
pub fn record_to_json(record: &TrackRecord) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.retain(|_, v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });
    }
    value
}

/// Validate a corrected record against the embedded track schema.
pub fn validate_record(record: &TrackRecord) -> Result<(), ValidationError> {
    validate(&TRACK_RECORD_SCHEMA, &record_to_json(record))
        .map_err(|errors| ValidationError::SchemaError { errors })
}

/// Quick check against the track schema.
pub fn is_valid_record(record: &TrackRecord) -> bool {
    is_valid(&TRACK_RECORD_SCHEMA, &record_to_json(record))
}
