//! Title composition: the inverse of [`extract_title`](crate::parser::extract_title).
//!
//! Fields are appended in display order, which differs from extraction order:
//!
//! ```text
//! work, workNumber, catalog, opus, opusNumber, in key, 'epithet' - movement
//! ```

use crate::error::{ParseError, ParseResult};
use crate::models::TitleFields;

/// Characters not allowed in a file name on common file systems.
const UNSAFE_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Build the canonical title for a set of fields.
///
/// Absent fields leave no separator behind. An opus number without an opus
/// is rejected.
pub fn compose_title(fields: &TitleFields) -> ParseResult<String> {
    let work = fields.work.trim();
    if work.is_empty() {
        return Err(ParseError::MissingField("work".to_string()));
    }

    if let (None, Some(number)) = (present(&fields.opus), present(&fields.opus_number)) {
        return Err(ParseError::OrphanOpusNumber(number.to_string()));
    }

    let mut title = work.to_string();

    for value in [
        &fields.work_number,
        &fields.catalog_number,
        &fields.opus,
        &fields.opus_number,
    ] {
        if let Some(value) = present(value) {
            title.push_str(", ");
            title.push_str(value);
        }
    }

    if let Some(key) = present(&fields.initial_key) {
        title.push_str(", in ");
        title.push_str(key);
    }

    if let Some(epithet) = present(&fields.epithet) {
        title.push_str(&format!(", '{}'", epithet));
    }

    if let Some(movement) = present(&fields.movement) {
        title.push_str(" - ");
        title.push_str(movement);
    }

    Ok(title)
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// File name stem for a track: `<trackNumber> - <sanitized title>`.
///
/// Without a track number the stem is the sanitized title alone.
pub fn suggested_stem(track_number: Option<&str>, title: &str) -> String {
    let safe_title = sanitize_filename(title.trim());
    match track_number.map(str::trim).filter(|n| !n.is_empty()) {
        Some(number) => format!("{} - {}", number, safe_title),
        None => safe_title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_title;

    fn full_fields() -> TitleFields {
        TitleFields {
            work: "String Quartet".into(),
            work_number: Some("No 75".into()),
            initial_key: Some("G".into()),
            catalog_number: Some("Hob.III:75".into()),
            opus: Some("Op 76".into()),
            opus_number: Some("No 1".into()),
            epithet: Some("Emperor".into()),
            movement: Some("I. Allegro con spirito".into()),
        }
    }

    #[test]
    fn test_compose_full_title() {
        assert_eq!(
            compose_title(&full_fields()).unwrap(),
            "String Quartet, No 75, Hob.III:75, Op 76, No 1, in G, 'Emperor' - I. Allegro con spirito"
        );
    }

    #[test]
    fn test_compose_work_only() {
        assert_eq!(compose_title(&TitleFields::new("Prelude")).unwrap(), "Prelude");
    }

    #[test]
    fn test_compose_skips_blank_fields() {
        let fields = TitleFields {
            opus: Some("  ".into()),
            movement: Some("II. Adagio".into()),
            ..TitleFields::new("Sonata")
        };
        assert_eq!(compose_title(&fields).unwrap(), "Sonata - II. Adagio");
    }

    #[test]
    fn test_compose_rejects_orphan_opus_number() {
        let fields = TitleFields {
            opus_number: Some("No 1".into()),
            ..TitleFields::new("Quartet")
        };
        assert_eq!(
            compose_title(&fields),
            Err(ParseError::OrphanOpusNumber("No 1".into()))
        );
    }

    #[test]
    fn test_compose_rejects_empty_work() {
        assert!(matches!(
            compose_title(&TitleFields::new(" ")),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let cases = vec![
            full_fields(),
            TitleFields::new("Prelude"),
            TitleFields {
                work_number: Some("No 41".into()),
                initial_key: Some("C".into()),
                catalog_number: Some("K 551".into()),
                epithet: Some("Jupiter".into()),
                movement: Some("I. Allegro vivace".into()),
                ..TitleFields::new("Symphony")
            },
            TitleFields {
                work_number: Some("No 3".into()),
                initial_key: Some("E-flat".into()),
                opus: Some("Op 55".into()),
                epithet: Some("Eroica".into()),
                movement: Some("IV. Finale".into()),
                ..TitleFields::new("Symphony")
            },
            TitleFields {
                initial_key: Some("G".into()),
                catalog_number: Some("HWV 319".into()),
                opus: Some("Op 6".into()),
                opus_number: Some("No 1".into()),
                movement: Some("I. A tempo giusto".into()),
                ..TitleFields::new("Concerto Grosso")
            },
            TitleFields {
                work_number: Some("No 9".into()),
                initial_key: Some("D minor".into()),
                opus: Some("Op 125".into()),
                ..TitleFields::new("Symphony")
            },
            TitleFields {
                catalog_number: Some("BWV 1007".into()),
                initial_key: Some("G".into()),
                movement: Some("III. Courante".into()),
                ..TitleFields::new("Cello Suite")
            },
            TitleFields {
                initial_key: Some("F-sharp".into()),
                epithet: Some("Farewell".into()),
                ..TitleFields::new("Symphony")
            },
        ];

        for fields in cases {
            let title = compose_title(&fields).unwrap();
            assert_eq!(extract_title(&title).unwrap(), fields, "title {}", title);
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_suggested_stem() {
        assert_eq!(
            suggested_stem(Some("01"), "Symphony, No 41 - I. Allegro: vivace"),
            "01 - Symphony, No 41 - I. Allegro_ vivace"
        );
        assert_eq!(suggested_stem(None, "Prelude"), "Prelude");
        assert_eq!(suggested_stem(Some(" "), "Prelude"), "Prelude");
    }
}
