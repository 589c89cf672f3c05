//! Field resolution: one [`TrackRecord`] from a track path and its tags.
//!
//! Values decoded from the folder structure or the title win over values read
//! from named tags. Every column remembers where its value came from.
//!
//! ```text
//! path ──▶ album folder ──▶ parse_album ─┐
//!      ├─▶ disc / track number ──────────┤
//! tags ──▶ title ──▶ extract_title ──────┼──▶ coalesce ──▶ TrackRecord
//!      └─▶ named tags ───────────────────┘
//! ```

use crate::error::{ParseError, ParseResult};
use crate::models::{columns, tag_keys, AlbumFields, FieldSource, TagMap, TitleFields, TrackRecord};
use crate::parser::{
    album_fields_from_tags, album_segment, disc_number, extract_title, is_machine_tagged,
    parse_album, title_fields_from_tags, track_number,
};

/// Title fields and where they came from.
///
/// Files already written by this tool carry one tag per field; those are read
/// directly. Otherwise the free-text title tag is parsed, and a lone `work`
/// tag is taken as is. Neither title nor work is the one error.
pub fn resolve_title(tags: &TagMap) -> ParseResult<(TitleFields, FieldSource)> {
    if is_machine_tagged(tags) {
        return Ok((title_fields_from_tags(tags), FieldSource::Tag));
    }

    match tags.get(tag_keys::TITLE) {
        Some(title) => Ok((extract_title(title)?, FieldSource::Title)),
        None if tags.contains(tag_keys::WORK) => Ok((title_fields_from_tags(tags), FieldSource::Tag)),
        None => Err(ParseError::MissingField(tag_keys::TITLE.to_string())),
    }
}

/// Album fields from the album folder, or from tags when the folder name does
/// not follow the `[YYYY] Album (Performers)` convention.
///
/// The second value is the source of the whole set.
pub fn resolve_album(track_path: &str, tags: &TagMap) -> (AlbumFields, FieldSource) {
    match album_segment(track_path).and_then(parse_album) {
        Some(fields) => (fields, FieldSource::Path),
        None => (album_fields_from_tags(tags), FieldSource::Tag),
    }
}

/// Column-by-column assembly with provenance.
struct Assembler {
    record: TrackRecord,
}

impl Assembler {
    fn new(path: &str) -> Self {
        Self { record: TrackRecord::new(path) }
    }

    /// First present candidate wins. Blank values count as absent.
    fn pick(
        &mut self,
        column: &'static str,
        candidates: impl IntoIterator<Item = (Option<String>, FieldSource)>,
    ) -> Option<String> {
        let chosen = candidates
            .into_iter()
            .find_map(|(value, source)| {
                value
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (v, source))
            });

        chosen.map(|(value, source)| {
            self.record.provenance.insert(column.to_string(), source);
            value
        })
    }
}

fn tag(tags: &TagMap, key: &str) -> (Option<String>, FieldSource) {
    (tags.get(key).map(str::to_string), FieldSource::Tag)
}

/// Build the review row for one track.
///
/// Fails only when the track has neither a title nor field-named tags.
pub fn resolve_track(track_path: &str, tags: &TagMap) -> ParseResult<TrackRecord> {
    let (title, title_source) = resolve_title(tags)?;
    let (album, album_source) = resolve_album(track_path, tags);
    let tag_album = album_fields_from_tags(tags);
    let tag_title = title_fields_from_tags(tags);

    let mut a = Assembler::new(track_path);

    let composer = a.pick(
        columns::COMPOSER,
        [tag(tags, tag_keys::COMPOSER), tag(tags, tag_keys::ARTIST)],
    );
    let album_name = a.pick(
        columns::ALBUM,
        [(album.album, album_source), (tag_album.album, FieldSource::Tag)],
    );
    let year_recorded = a.pick(
        columns::YEAR_RECORDED,
        [
            (album.year_recorded, album_source),
            (tag_album.year_recorded, FieldSource::Tag),
        ],
    );
    let orchestra = a.pick(
        columns::ORCHESTRA,
        [(album.orchestra, album_source), (tag_album.orchestra, FieldSource::Tag)],
    );
    let conductor = a.pick(
        columns::CONDUCTOR,
        [(album.conductor, album_source), (tag_album.conductor, FieldSource::Tag)],
    );
    let soloists = a.pick(columns::SOLOISTS, [tag(tags, tag_keys::SOLOISTS)]);
    let arranger = a.pick(columns::ARRANGER, [tag(tags, tag_keys::ARRANGER)]);
    let genre = a.pick(columns::GENRE, [tag(tags, tag_keys::GENRE)]);
    let disc = a.pick(
        columns::DISC_NUMBER,
        [
            (disc_number(track_path), FieldSource::Path),
            tag(tags, tag_keys::DISC_NUMBER),
        ],
    );
    let track = a.pick(
        columns::TRACK_NUMBER,
        [
            (track_number(track_path), FieldSource::Path),
            tag(tags, tag_keys::TRACK_NUMBER),
        ],
    );
    let raw_title = a.pick(columns::TITLE, [tag(tags, tag_keys::TITLE)]);
    let track_title = a.pick(columns::TRACK_TITLE, [tag(tags, tag_keys::TRACK_TITLE)]);

    let work = a.pick(
        columns::WORK,
        [(Some(title.work), title_source), (Some(tag_title.work), FieldSource::Tag)],
    );
    let work_number = a.pick(
        columns::WORK_NUMBER,
        [(title.work_number, title_source), (tag_title.work_number, FieldSource::Tag)],
    );
    let initial_key = a.pick(
        columns::INITIAL_KEY,
        [(title.initial_key, title_source), (tag_title.initial_key, FieldSource::Tag)],
    );
    let catalog_number = a.pick(
        columns::CATALOG_NUMBER,
        [
            (title.catalog_number, title_source),
            (tag_title.catalog_number, FieldSource::Tag),
        ],
    );
    let opus = a.pick(
        columns::OPUS,
        [(title.opus, title_source), (tag_title.opus, FieldSource::Tag)],
    );
    let opus_number = a.pick(
        columns::OPUS_NUMBER,
        [(title.opus_number, title_source), (tag_title.opus_number, FieldSource::Tag)],
    );
    let epithet = a.pick(
        columns::EPITHET,
        [(title.epithet, title_source), (tag_title.epithet, FieldSource::Tag)],
    );
    let movement = a.pick(
        columns::MOVEMENT,
        [(title.movement, title_source), (tag_title.movement, FieldSource::Tag)],
    );

    Ok(TrackRecord {
        composer,
        album: album_name,
        year_recorded,
        orchestra,
        conductor,
        soloists,
        arranger,
        genre,
        disc_number: disc,
        track_number: track,
        title: raw_title,
        track_title,
        work,
        work_number,
        initial_key,
        catalog_number,
        opus,
        opus_number,
        epithet,
        movement,
        ..a.record
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/music/Classical/Haydn/Quartets/[2009] String Quartets Op 76 (Quatuor Mosaiques)/Disc 2/01 - Quartet.flac";

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_resolve_from_path_and_title() {
        let tags = tags(&[
            ("TITLE", "String Quartet No 75 in G, Op 76 No 1, Hob.III:75 - I. Allegro con spirito"),
            ("ARTIST", "Joseph Haydn"),
            ("GENRE", "Classical"),
            ("ALBUM", "Wrong Album"),
            ("DATE", "2010"),
        ]);

        let record = resolve_track(PATH, &tags).unwrap();
        assert_eq!(record.composer.as_deref(), Some("Joseph Haydn"));
        assert_eq!(record.album.as_deref(), Some("String Quartets Op 76"));
        assert_eq!(record.year_recorded.as_deref(), Some("2009"));
        assert_eq!(record.orchestra.as_deref(), Some("Quatuor Mosaiques"));
        assert_eq!(record.conductor, None);
        assert_eq!(record.disc_number.as_deref(), Some("2"));
        assert_eq!(record.track_number.as_deref(), Some("01"));
        assert_eq!(record.work.as_deref(), Some("String Quartet"));
        assert_eq!(record.opus_number.as_deref(), Some("No 1"));
        assert_eq!(record.genre.as_deref(), Some("Classical"));

        assert_eq!(record.source_of(columns::ALBUM), Some(FieldSource::Path));
        assert_eq!(record.source_of(columns::WORK), Some(FieldSource::Title));
        assert_eq!(record.source_of(columns::COMPOSER), Some(FieldSource::Tag));
        assert_eq!(record.source_of(columns::CONDUCTOR), None);
    }

    #[test]
    fn test_composer_tag_preferred_over_artist() {
        let tags = tags(&[("title", "Prelude"), ("artist", "Performer"), ("composer", "Bach")]);
        let record = resolve_track("/m/Album/01 - Prelude.flac", &tags).unwrap();
        assert_eq!(record.composer.as_deref(), Some("Bach"));
    }

    #[test]
    fn test_album_falls_back_to_tags() {
        let tags = tags(&[
            ("title", "Prelude"),
            ("album", "Cello Suites"),
            ("year", "1983"),
            ("orchestra", "Solo"),
        ]);
        let record = resolve_track("/music/Unsorted/Prelude.flac", &tags).unwrap();
        assert_eq!(record.album.as_deref(), Some("Cello Suites"));
        assert_eq!(record.year_recorded.as_deref(), Some("1983"));
        assert_eq!(record.orchestra.as_deref(), Some("Solo"));
        assert_eq!(record.track_number, None);
        assert_eq!(record.source_of(columns::ALBUM), Some(FieldSource::Tag));
    }

    #[test]
    fn test_missing_performers_filled_from_tags() {
        let tags = tags(&[("title", "Prelude"), ("conductor", "Richter")]);
        let record = resolve_track("/m/[1971] Album (Munchener Bach-Orchester)/01 - Prelude.flac", &tags).unwrap();
        assert_eq!(record.orchestra.as_deref(), Some("Munchener Bach-Orchester"));
        assert_eq!(record.conductor.as_deref(), Some("Richter"));
        assert_eq!(record.source_of(columns::CONDUCTOR), Some(FieldSource::Tag));
    }

    #[test]
    fn test_machine_tagged_file_reads_field_tags() {
        let tags = tags(&[
            ("TITLE", "Symphony, No 41, K 551, in C, 'Jupiter' - I. Allegro vivace"),
            ("WORK", "Symphony"),
            ("WORK NUMBER", "No 41"),
            ("CATALOG #", "K 551"),
            ("INITIALKEY", "C"),
            ("EPITHET", "Jupiter"),
            ("MOVEMENT", "I. Allegro vivace"),
            ("TRACKNUMBER", "7"),
        ]);
        let record = resolve_track("/m/Album/Symphony.flac", &tags).unwrap();
        assert_eq!(record.work.as_deref(), Some("Symphony"));
        assert_eq!(record.catalog_number.as_deref(), Some("K 551"));
        assert_eq!(record.track_number.as_deref(), Some("7"));
        assert_eq!(record.source_of(columns::WORK), Some(FieldSource::Tag));
        assert_eq!(record.source_of(columns::TRACK_NUMBER), Some(FieldSource::Tag));
    }

    #[test]
    fn test_foreign_work_tag_still_parses_title() {
        let picard = tags(&[
            ("TITLE", "Concerto Grosso in G, Op 6 No 1 - I. A tempo giusto"),
            ("WORK", "Concerti Grossi, Op. 6"),
        ]);
        let record = resolve_track(PATH, &picard).unwrap();
        assert_eq!(record.work.as_deref(), Some("Concerto Grosso"));
        assert_eq!(record.opus_number.as_deref(), Some("No 1"));
        assert_eq!(record.source_of(columns::WORK), Some(FieldSource::Title));

        let work_only = resolve_track(PATH, &tags(&[("WORK", "Messiah")])).unwrap();
        assert_eq!(work_only.work.as_deref(), Some("Messiah"));
    }

    #[test]
    fn test_no_title_is_missing_field() {
        let err = resolve_track(PATH, &tags(&[("artist", "Haydn")])).unwrap_err();
        assert_eq!(err, ParseError::MissingField("title".into()));
    }
}
