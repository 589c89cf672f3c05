//! Field extraction from a track path.
//!
//! Libraries are laid out as
//! `.../<Genre>/<Composer>/<Group>/[YYYY] Album (Performers)/[Disc N/]NN - Title.flac`.
//! Only the album folder, disc folder and file name are interpreted here.

use once_cell::sync::Lazy;
use regex::Regex;

/// `Disc 07`, `Disk5`, `CD 3` - anywhere in a folder name.
static DISC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:disc|disk|cd)\s*(\d+)\b").expect("valid disc regex"));

/// A folder that is nothing but a disc marker.
static DISC_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:disc|disk|cd)\s*\d+\b").expect("valid disc folder regex"));

/// `01 - Title.flac`
static TRACK_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+-\s+").expect("valid track number regex"));

fn segments(track_path: &str) -> Vec<&str> {
    track_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Folders enclosing the file, root first.
fn folders(track_path: &str) -> Vec<&str> {
    let mut parts = segments(track_path);
    parts.pop();
    parts
}

/// The album folder name: the nearest enclosing folder that is not a disc folder.
pub fn album_segment(track_path: &str) -> Option<&str> {
    folders(track_path)
        .into_iter()
        .rev()
        .find(|folder| !DISC_FOLDER.is_match(folder))
}

/// Disc number from the enclosing folders, leading zeros kept.
///
/// The first matching folder from the root wins.
pub fn disc_number(track_path: &str) -> Option<String> {
    folders(track_path).into_iter().find_map(|folder| {
        DISC_NUMBER
            .captures(folder)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Track number from a `NN - Title.ext` file name, leading zeros kept.
pub fn track_number(track_path: &str) -> Option<String> {
    let file_name = segments(track_path).pop()?;
    TRACK_NUMBER
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
