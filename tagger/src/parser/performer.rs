//! Orchestra / conductor split of a performer string.
//!
//! Folder names carry performers in three conventions:
//!
//! ```text
//! B'Rock Orchestra with Dmitry Sinkovsky    Orchestra with Conductor
//! Harnoncourt, Concentus Musicus Wien       Conductor, Orchestra  (by word count)
//! Brandenburg Consort, Goodman              Orchestra, Conductor  (by word count)
//! Capella Savaria                           Orchestra only
//! ```

/// Split performers into `(orchestra, conductor)`.
///
/// Rules, in order:
/// 1. ` with ` splits on its first occurrence: orchestra, then conductor.
/// 2. A comma splits at its first occurrence; the part with more words is the
///    orchestra. On equal word counts the first part is the orchestra.
/// 3. Otherwise the whole string is the orchestra.
pub fn parse_performer(performers: &str) -> (String, Option<String>) {
    let performers = performers.trim();

    if let Some((orchestra, conductor)) = performers.split_once(" with ") {
        return (orchestra.trim().to_string(), Some(conductor.trim().to_string()));
    }

    if let Some((first, second)) = performers.split_once(',') {
        let (first, second) = (first.trim(), second.trim());
        let first_words = first.split_whitespace().count();
        let second_words = second.split_whitespace().count();

        return if second_words > first_words {
            (second.to_string(), Some(first.to_string()))
        } else {
            (first.to_string(), Some(second.to_string()))
        };
    }

    (performers.to_string(), None)
}
