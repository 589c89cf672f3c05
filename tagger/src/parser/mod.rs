//! Parsers for the strings a classical library carries its metadata in.
//!
//! - [`performer`] - `Orchestra with Conductor` and comma-separated variants
//! - [`album`] - `[YYYY] Album (Performers)` folder names, with a tag fallback
//! - [`path`] - album folder, disc number and track number from a track path
//! - [`title`] - the eight fields of a free-text title
//!
//! Everything here is pure: strings in, fields out.

pub mod album;
pub mod path;
pub mod performer;
pub mod title;

pub use album::{album_fields_from_tags, parse_album};
pub use path::{album_segment, disc_number, track_number};
pub use performer::parse_performer;
pub use title::{extract_title, is_machine_tagged, title_fields_from_tags};
