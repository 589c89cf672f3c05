//! Album folder parsing: `[YYYY] Album Name (Performers)`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::performer::parse_performer;
use crate::models::{tag_keys, AlbumFields, TagMap};

static BRACKET_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d{4})\]\s+(.+)$").expect("valid album regex"));

/// Parse an album folder name.
///
/// Returns `None` when the string does not start with a bracketed year, so the
/// caller can fall back to tags. A missing trailing parenthetical is not a
/// failure: the whole remainder becomes the album and the performers stay empty.
pub fn parse_album(album: &str) -> Option<AlbumFields> {
    let caps = BRACKET_YEAR.captures(album.trim())?;
    let year = caps[1].to_string();
    let rest = caps[2].trim();

    let split = rest
        .rfind(" (")
        .filter(|_| rest.ends_with(')'))
        .map(|idx| (&rest[..idx], &rest[idx + 2..rest.len() - 1]));

    let fields = match split {
        Some((name, performers)) if !performers.trim().is_empty() => {
            let (orchestra, conductor) = parse_performer(performers);
            AlbumFields {
                album: Some(name.trim().to_string()),
                year_recorded: Some(year),
                orchestra: Some(orchestra).filter(|o| !o.is_empty()),
                conductor,
            }
        }
        _ => AlbumFields {
            album: Some(rest.to_string()),
            year_recorded: Some(year),
            ..AlbumFields::default()
        },
    };

    Some(fields)
}

/// Album fields read straight from tags. Absent tags stay `None`.
pub fn album_fields_from_tags(tags: &TagMap) -> AlbumFields {
    let owned = |key: &str| tags.get(key).map(str::to_string);

    AlbumFields {
        album: owned(tag_keys::ALBUM),
        year_recorded: tags
            .first_of(&[tag_keys::YEAR_RECORDED, tag_keys::YEAR, tag_keys::DATE])
            .map(str::to_string),
        orchestra: owned(tag_keys::ORCHESTRA),
        conductor: owned(tag_keys::CONDUCTOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_album_with_conductor() {
        let fields = parse_album(
            "[1971] Concerti Grossi Op 3 & Op 6 (Munchener Bach-Orchester with Karl Richter)",
        )
        .unwrap();
        assert_eq!(fields.album.as_deref(), Some("Concerti Grossi Op 3 & Op 6"));
        assert_eq!(fields.year_recorded.as_deref(), Some("1971"));
        assert_eq!(fields.orchestra.as_deref(), Some("Munchener Bach-Orchester"));
        assert_eq!(fields.conductor.as_deref(), Some("Karl Richter"));
    }

    #[test]
    fn test_parse_album_orchestra_only() {
        let fields = parse_album("[2009] Haydn Symphonies (Capella Savaria)").unwrap();
        assert_eq!(fields.album.as_deref(), Some("Haydn Symphonies"));
        assert_eq!(fields.orchestra.as_deref(), Some("Capella Savaria"));
        assert_eq!(fields.conductor, None);
    }

    #[test]
    fn test_parse_album_splits_at_last_parenthesis() {
        let fields = parse_album("[1985] Symphony No 9 (Choral) (Berliner Philharmoniker, Karajan)").unwrap();
        assert_eq!(fields.album.as_deref(), Some("Symphony No 9 (Choral)"));
        assert_eq!(fields.orchestra.as_deref(), Some("Berliner Philharmoniker"));
        assert_eq!(fields.conductor.as_deref(), Some("Karajan"));
    }

    #[test]
    fn test_parse_album_without_performers() {
        let fields = parse_album("[2001] Goldberg Variations").unwrap();
        assert_eq!(fields.album.as_deref(), Some("Goldberg Variations"));
        assert_eq!(fields.year_recorded.as_deref(), Some("2001"));
        assert_eq!(fields.orchestra, None);
        assert_eq!(fields.conductor, None);
    }

    #[test]
    fn test_parse_album_no_year_is_none() {
        assert_eq!(parse_album("Goldberg Variations (Gould)"), None);
        assert_eq!(parse_album("[71] Album"), None);
    }

    #[test]
    fn test_album_fields_from_tags() {
        let tags: TagMap = [("ALBUM", "Brandenburg Concertos"), ("DATE", "1982"), ("CONDUCTOR", "Pinnock")]
            .into_iter()
            .collect();
        let fields = album_fields_from_tags(&tags);
        assert_eq!(fields.album.as_deref(), Some("Brandenburg Concertos"));
        assert_eq!(fields.year_recorded.as_deref(), Some("1982"));
        assert_eq!(fields.orchestra, None);
        assert_eq!(fields.conductor.as_deref(), Some("Pinnock"));
    }

    #[test]
    fn test_album_fields_from_tags_prefers_year_recorded() {
        let tags: TagMap = [("date", "2020"), ("year recorded", "1971")].into_iter().collect();
        assert_eq!(album_fields_from_tags(&tags).year_recorded.as_deref(), Some("1971"));
    }

    #[test]
    fn test_album_fields_from_empty_tags() {
        assert_eq!(album_fields_from_tags(&TagMap::new()), AlbumFields::default());
    }
}
