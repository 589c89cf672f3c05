//! Review sheet: one CSV row per track, edited by hand between `read` and `write`.
//!
//! Sheets are written as UTF-8 with a byte order mark so spreadsheet programs
//! pick the right encoding. On the way back in, the encoding and delimiter are
//! detected, since a round trip through a spreadsheet may change both.

use std::fs;
use std::path::Path;

use crate::error::{SheetError, SheetResult};
use crate::models::{columns, FailedTrack, TrackRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extra column of the failure sheet.
pub const REASON_COLUMN: &str = "Reason";

/// A sheet read back from disk.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub records: Vec<TrackRecord>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

// =============================================================================
// Writing
// =============================================================================

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn cells(record: &TrackRecord) -> [&str; 21] {
    [
        record.path.as_str(),
        cell(&record.composer),
        cell(&record.album),
        cell(&record.year_recorded),
        cell(&record.orchestra),
        cell(&record.conductor),
        cell(&record.soloists),
        cell(&record.arranger),
        cell(&record.genre),
        cell(&record.disc_number),
        cell(&record.track_number),
        cell(&record.title),
        cell(&record.track_title),
        cell(&record.work),
        cell(&record.work_number),
        cell(&record.initial_key),
        cell(&record.catalog_number),
        cell(&record.opus),
        cell(&record.opus_number),
        cell(&record.epithet),
        cell(&record.movement),
    ]
}

fn write_rows<'a, I>(path: &Path, extra_header: Option<&str>, rows: I) -> SheetResult<()>
where
    I: IntoIterator<Item = (&'a TrackRecord, Option<&'a str>)>,
{
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

    let mut header: Vec<&str> = columns::ALL.to_vec();
    header.extend(extra_header);
    writer.write_record(&header)?;

    for (record, extra) in rows {
        let mut row: Vec<&str> = cells(record).to_vec();
        row.extend(extra);
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SheetError::IoError(e.into_error()))?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Write the review sheet.
pub fn write_sheet(path: impl AsRef<Path>, records: &[TrackRecord]) -> SheetResult<()> {
    write_rows(path.as_ref(), None, records.iter().map(|r| (r, None)))
}

/// Write failed tracks with an extra `Reason` column.
///
/// The result is itself a valid review sheet: fix the rows and feed it back.
pub fn write_failure_sheet(path: impl AsRef<Path>, failures: &[FailedTrack]) -> SheetResult<()> {
    write_rows(
        path.as_ref(),
        Some(REASON_COLUMN),
        failures.iter().map(|f| (&f.record, Some(f.reason.as_str()))),
    )
}

// =============================================================================
// Reading
// =============================================================================

/// Detect the encoding of raw bytes. Valid UTF-8 wins; otherwise chardet decides.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }
    let (charset, _, _) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with a detected encoding.
///
/// Bytes claimed to be UTF-8 must be valid UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SheetResult<String> {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| SheetError::EncodingError(e.to_string())),
        // Labels encoding_rs does not know fall back to Windows-1252
        other => {
            let enc = encoding_rs::Encoding::for_label(other.as_bytes())
                .unwrap_or(encoding_rs::WINDOWS_1252);
            Ok(enc.decode(bytes).0.into_owned())
        }
    }
}

/// Detect the delimiter by counting occurrences in the header line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse sheet bytes with encoding and delimiter detection.
pub fn parse_sheet_bytes(bytes: &[u8]) -> SheetResult<Sheet> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(SheetError::EmptySheet);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    for required in [columns::PATH, columns::WORK] {
        if !headers.iter().any(|h| h == required) {
            return Err(SheetError::MissingColumn(required.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<TrackRecord>() {
        let record = row?;
        if record.path.is_empty() {
            continue;
        }
        records.push(record);
    }

    Ok(Sheet { records, encoding, delimiter })
}

/// Read a review sheet from disk.
pub fn read_sheet(path: impl AsRef<Path>) -> SheetResult<Sheet> {
    let bytes = fs::read(path.as_ref())?;
    parse_sheet_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TrackRecord {
        TrackRecord {
            composer: Some("Mozart".into()),
            album: Some("Symphonies".into()),
            year_recorded: Some("1961".into()),
            work: Some("Symphony".into()),
            work_number: Some("No 41".into()),
            title: Some("Symphony No 41 in C, 'Jupiter', K 551 - I. Allegro vivace".into()),
            catalog_number: Some("K 551".into()),
            ..TrackRecord::new("/music/[1961] Symphonies/01 - Symphony.flac")
        }
    }

    #[test]
    fn test_write_then_read_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.csv");

        write_sheet(&path, &[record()]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.delimiter, ',');
        assert_eq!(sheet.encoding, "utf-8");
        assert_eq!(sheet.records, vec![record()]);
        assert_eq!(sheet.records[0].opus, None);
    }

    #[test]
    fn test_semicolon_sheet_with_missing_columns() {
        let content = "Path;Work;Opus\n/m/01 - a.flac;Sonata;Op 2\n/m/02 - b.flac;Sonata;\n";
        let sheet = parse_sheet_bytes(content.as_bytes()).unwrap();

        assert_eq!(sheet.delimiter, ';');
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].opus.as_deref(), Some("Op 2"));
        assert_eq!(sheet.records[1].opus, None);
        assert_eq!(sheet.records[1].composer, None);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Prélude" in ISO-8859-1
        let bytes: &[u8] = &[0x50, 0x72, 0xE9, 0x6C, 0x75, 0x64, 0x65];
        assert_eq!(decode_content(bytes, "iso-8859-1").unwrap(), "Prélude");
        // ¤ ¼ ½ ¾ differ between Latin-1 and Latin-9
        assert_eq!(decode_content(&[0xA4, 0xBC, 0xBD, 0xBE], "iso-8859-1").unwrap(), "¤¼½¾");
        assert!(decode_content(bytes, "utf-8").is_err());
    }

    #[test]
    fn test_non_utf8_sheet_is_decoded() {
        let mut bytes = b"Path,Work\n/m/a.flac,Pr".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"lude\n");

        let sheet = parse_sheet_bytes(&bytes).unwrap();
        assert_ne!(sheet.encoding, "utf-8");
        assert_eq!(sheet.records[0].path, "/m/a.flac");
        assert!(sheet.records[0].work.as_deref().unwrap().starts_with("Pr"));
    }

    #[test]
    fn test_missing_work_column() {
        let err = parse_sheet_bytes(b"Path,Opus\n/m/a.flac,Op 1\n").unwrap_err();
        assert!(matches!(err, SheetError::MissingColumn(c) if c == "Work"));
    }

    #[test]
    fn test_empty_sheet() {
        assert!(matches!(parse_sheet_bytes(b"\xEF\xBB\xBF"), Err(SheetError::EmptySheet)));
        assert!(matches!(parse_sheet_bytes(b"  \n"), Err(SheetError::EmptySheet)));
    }

    #[test]
    fn test_failure_sheet_has_reason_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.csv");
        let failure = FailedTrack::new(record(), "Opus number 'No 1' has no opus");

        write_failure_sheet(&path, &[failure]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header = content.trim_start_matches('\u{feff}').lines().next().unwrap();
        assert!(header.ends_with(",Reason"));

        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.records, vec![record()]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }
}
