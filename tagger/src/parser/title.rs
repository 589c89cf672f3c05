//! Title field extraction.
//!
//! A title such as
//!
//! ```text
//! String Quartet No 75 in G, Op 76 No 1, Hob.III:75 - I. Allegro con spirito
//! ```
//!
//! is decoded by stripping fields from the outside in, in a fixed order:
//!
//! ```text
//! movement -> epithet -> opus (+ number) -> work number -> catalog -> key -> work
//! ```
//!
//! Each stage takes the current remainder and returns a new remainder plus the
//! field it recognised. A stage that does not match returns the remainder
//! unchanged. The order matters: later stages rely on earlier ones having
//! removed the text they would otherwise misread.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseError, ParseResult};
use crate::models::{tag_keys, TagMap, TitleFields};

static MOVEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.+?) - (?P<movement>[IVXLCDM]+\. .+)$").expect("valid movement regex")
});

static EPITHET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.+?),?\s'(?P<epithet>.+?)'(?P<post>(?:,.*)?)$")
        .expect("valid epithet regex")
});

static OPUS_WITH_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.+?),\s*(?P<opus>Op\s*\d+),?\s+(?P<number>No\s*\d+)\b(?P<post>.*)$")
        .expect("valid opus number regex")
});

static OPUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.+?),\s*(?P<opus>Op\s*\d+)\b(?P<post>.*)$").expect("valid opus regex")
});

static WORK_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.+?),?\s(?P<number>No\s*\d+)\b(?P<post>.*)$")
        .expect("valid work number regex")
});

static INITIAL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<pre>.*?),?\sin\s(?P<key>[A-G](?:-flat|-sharp)?(?:\s(?:major|minor))?)$")
        .expect("valid key regex")
});

/// Output of one stage: the remaining text and what was taken from it.
type Stage<T> = (String, Option<T>);

/// Opus and the number qualifying it.
#[derive(Debug, Default, PartialEq, Eq)]
struct Numbering {
    opus: Option<String>,
    opus_number: Option<String>,
}

fn splice(pre: &str, post: &str) -> String {
    format!("{}{}", pre.trim_end(), post)
}

/// `... - I. Allegro` at the end. The first such separator splits.
pub(crate) fn strip_movement(title: &str) -> Stage<String> {
    match MOVEMENT.captures(title) {
        Some(caps) => (caps["pre"].to_string(), Some(caps["movement"].trim().to_string())),
        None => (title.to_string(), None),
    }
}

/// `..., 'Jupiter'` followed by the end of the text or a comma.
fn strip_epithet(remainder: &str) -> Stage<String> {
    match EPITHET.captures(remainder) {
        Some(caps) => {
            let pre = caps["pre"].trim_end_matches(',');
            (splice(pre, &caps["post"]), Some(caps["epithet"].trim().to_string()))
        }
        None => (remainder.to_string(), None),
    }
}

/// `, Op 76 No 1` first, then `, Op 76` alone.
fn strip_opus(remainder: &str) -> Stage<Numbering> {
    if let Some(caps) = OPUS_WITH_NUMBER.captures(remainder) {
        let numbering = Numbering {
            opus: Some(caps["opus"].to_string()),
            opus_number: Some(caps["number"].to_string()),
        };
        return (splice(&caps["pre"], &caps["post"]), Some(numbering));
    }

    if let Some(caps) = OPUS.captures(remainder) {
        let numbering = Numbering {
            opus: Some(caps["opus"].to_string()),
            opus_number: None,
        };
        return (splice(&caps["pre"], &caps["post"]), Some(numbering));
    }

    (remainder.to_string(), None)
}

/// A lone `No 41`. Runs after the opus stage so it never takes an opus number.
fn strip_work_number(remainder: &str) -> Stage<String> {
    match WORK_NUMBER.captures(remainder) {
        Some(caps) => {
            let pre = caps["pre"].trim_end_matches(',');
            (splice(pre, &caps["post"]), Some(caps["number"].to_string()))
        }
        None => (remainder.to_string(), None),
    }
}

/// The last comma-separated segment (never the first) ending in a digit.
fn strip_catalog(remainder: &str) -> Stage<String> {
    let segments: Vec<&str> = remainder.split(',').collect();

    let found = segments
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .find(|(_, segment)| {
            segment
                .trim()
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_digit())
        })
        .map(|(idx, _)| idx);

    match found {
        Some(idx) => {
            let catalog = segments[idx].trim().to_string();
            let rest: Vec<&str> = segments
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, s)| *s)
                .collect();
            (rest.join(","), Some(catalog))
        }
        None => (remainder.to_string(), None),
    }
}

/// `in G`, `in C minor`, `in E-flat` at the end.
fn strip_initial_key(remainder: &str) -> Stage<String> {
    match INITIAL_KEY.captures(remainder.trim_end()) {
        Some(caps) if !caps["pre"].trim().is_empty() => {
            (caps["pre"].to_string(), Some(caps["key"].to_string()))
        }
        _ => (remainder.to_string(), None),
    }
}

fn finish_work(remainder: &str) -> String {
    remainder.trim().trim_end_matches(',').trim_end().to_string()
}

/// Decode a title into its eight fields.
///
/// Only an empty title is an error; text no stage recognises stays in `work`.
pub fn extract_title(title: &str) -> ParseResult<TitleFields> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ParseError::MissingField(tag_keys::TITLE.to_string()));
    }

    let (remainder, movement) = strip_movement(title);
    let (remainder, epithet) = strip_epithet(&remainder);
    let (remainder, numbering) = strip_opus(&remainder);
    let (remainder, work_number) = strip_work_number(&remainder);
    let (remainder, catalog_number) = strip_catalog(&remainder);
    let (remainder, initial_key) = strip_initial_key(&remainder);
    let numbering = numbering.unwrap_or_default();

    let work = finish_work(&remainder);
    if work.is_empty() {
        // Nothing left to name the work: keep the title whole, unsplit
        return Ok(TitleFields::new(title));
    }

    Ok(TitleFields {
        work,
        work_number,
        initial_key,
        catalog_number,
        opus: numbering.opus,
        opus_number: numbering.opus_number,
        epithet,
        movement,
    })
}

/// Title fields this tool writes besides `work`.
const FIELD_KEYS: [&str; 7] = [
    tag_keys::WORK_NUMBER,
    tag_keys::INITIAL_KEY,
    tag_keys::CATALOG_NUMBER,
    tag_keys::OPUS,
    tag_keys::OPUS_NUMBER,
    tag_keys::EPITHET,
    tag_keys::MOVEMENT,
];

/// Whether the tags were written by this tool.
///
/// A `work` tag alone is not enough: either one
/// of the other field tags is present, or the title is the bare work.
pub fn is_machine_tagged(tags: &TagMap) -> bool {
    let Some(work) = tags.get(tag_keys::WORK) else {
        return false;
    };
    FIELD_KEYS.iter().any(|key| tags.contains(key)) || tags.get(tag_keys::TITLE) == Some(work)
}

/// Title fields read straight from field-named tags.
///
/// `work` falls back to the title tag, then to the empty string.
pub fn title_fields_from_tags(tags: &TagMap) -> TitleFields {
    let owned = |key: &str| tags.get(key).map(str::to_string);

    TitleFields {
        work: tags
            .first_of(&[tag_keys::WORK, tag_keys::TITLE])
            .unwrap_or_default()
            .to_string(),
        work_number: owned(tag_keys::WORK_NUMBER),
        initial_key: owned(tag_keys::INITIAL_KEY),
        catalog_number: owned(tag_keys::CATALOG_NUMBER),
        opus: owned(tag_keys::OPUS),
        opus_number: owned(tag_keys::OPUS_NUMBER),
        epithet: owned(tag_keys::EPITHET),
        movement: owned(tag_keys::MOVEMENT),
    }
}
