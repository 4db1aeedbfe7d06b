//! Timestamp matcher: find and strictly parse the timestamp in one line.

use crate::types::{TimestampMatch, TimestampSpec};

impl TimestampSpec {
    /// Try to recognize a timestamp in `line`.
    ///
    /// A line that does not carry a parseable timestamp is simply `None`;
    /// the segmenter treats it as continuation content.
    pub fn match_line(&self, line: &str) -> Option<TimestampMatch> {
        let candidate = match self {
            Self::Delimited { start, end, .. } => between_delimiters(line, start, end)?,
            Self::FixedWidth { format } => leading_chars(line, format.width())?,
        };

        let instant = self.format().parse_millis(candidate)?;
        Some(TimestampMatch {
            instant,
            display_text: candidate.to_string(),
        })
    }
}

/// Match with either side possibly absent; absence is never an error.
pub fn match_timestamp(line: Option<&str>, spec: Option<&TimestampSpec>) -> Option<TimestampMatch> {
    spec?.match_line(line?)
}

/// Text strictly between the first `start` and the first `end` after it.
fn between_delimiters<'a>(line: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = line.find(start)? + start.len();
    let len = line[from..].find(end)?;
    Some(&line[from..from + len])
}

/// The first `width` characters, or `None` if the line is shorter.
fn leading_chars(line: &str, width: usize) -> Option<&str> {
    match line.char_indices().nth(width) {
        Some((end, _)) => Some(&line[..end]),
        None if line.chars().count() == width => Some(line),
        None => None,
    }
}
