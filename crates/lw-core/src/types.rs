//! Core merge types: timestamp specs and log entries.

use serde::Serialize;

use crate::error::{MergeError, MergeResult};
use crate::pattern::TimestampFormat;

/// Separator written after every line of an entry payload.
pub const LINE_SEP: &str = "\n";

// ── Timestamp Spec ────────────────────────────────────────────

/// How to find and parse the timestamp that starts an entry.
///
/// Exactly one recognition mode is active per source. A spec is immutable
/// once built and is shared read-only by every line of its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampSpec {
    /// Timestamp sits between the first `start` delimiter and the first
    /// `end` delimiter after it, anywhere in the line.
    Delimited {
        format: TimestampFormat,
        start: String,
        end: String,
    },
    /// Timestamp is the line's leading `format.width()` characters.
    FixedWidth { format: TimestampFormat },
}

impl TimestampSpec {
    /// Build a delimiter-mode spec. Both delimiters must be non-empty.
    pub fn delimited(
        pattern: &str,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> MergeResult<Self> {
        let (start, end) = (start.into(), end.into());
        if start.is_empty() || end.is_empty() {
            return Err(MergeError::Spec(format!(
                "delimiters must be non-empty (start '{start}', end '{end}')"
            )));
        }
        Ok(Self::Delimited {
            format: TimestampFormat::compile(pattern)?,
            start,
            end,
        })
    }

    /// Build a fixed-width prefix spec.
    pub fn fixed_width(pattern: &str) -> MergeResult<Self> {
        Ok(Self::FixedWidth {
            format: TimestampFormat::compile(pattern)?,
        })
    }

    /// Build from an optional delimiter pair; both or neither must be given.
    pub fn from_parts(
        pattern: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> MergeResult<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::delimited(pattern, start, end),
            (None, None) => Self::fixed_width(pattern),
            (start, end) => Err(MergeError::Spec(format!(
                "start and end delimiters must be given together (start {start:?}, end {end:?})"
            ))),
        }
    }

    pub fn format(&self) -> &TimestampFormat {
        match self {
            Self::Delimited { format, .. } | Self::FixedWidth { format } => format,
        }
    }
}

// ── Timestamp Match ───────────────────────────────────────────

/// A timestamp recognized in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampMatch {
    /// Milliseconds since the Unix epoch, before any offset.
    pub instant: i64,
    /// The exact text that was parsed.
    pub display_text: String,
}

// ── Log Entry ─────────────────────────────────────────────────

/// One logical record: a timestamp line plus its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Source label (file path or in-memory label).
    pub source: String,
    /// Offset-corrected milliseconds since the Unix epoch. The merge key.
    pub instant: i64,
    /// Timestamp text exactly as it appeared in the line.
    pub display_text: String,
    /// Timestamp line and continuation lines, each followed by [`LINE_SEP`].
    pub payload: String,
    /// 1-based line number of the timestamp line within its source.
    pub line_number: usize,
}

impl LogEntry {
    /// Payload split into its physical lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.payload.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_requires_both_delimiters() {
        assert!(TimestampSpec::delimited("HH:mm:ss", "[", "").is_err());
        assert!(TimestampSpec::delimited("HH:mm:ss", "", "]").is_err());
        assert!(TimestampSpec::delimited("HH:mm:ss", "[", "]").is_ok());
    }

    #[test]
    fn from_parts_selects_mode() {
        let spec = TimestampSpec::from_parts("HH:mm:ss", Some("["), Some("]")).unwrap();
        assert!(matches!(spec, TimestampSpec::Delimited { .. }));

        let spec = TimestampSpec::from_parts("HH:mm:ss", None, None).unwrap();
        assert!(matches!(spec, TimestampSpec::FixedWidth { .. }));

        let err = TimestampSpec::from_parts("HH:mm:ss", Some("["), None).unwrap_err();
        assert!(matches!(err, MergeError::Spec(_)));
    }

    #[test]
    fn bad_pattern_fails_spec() {
        let err = TimestampSpec::fixed_width("yyyy-QQ").unwrap_err();
        assert!(matches!(err, MergeError::Pattern { .. }));
    }

    #[test]
    fn entry_lines() {
        let entry = LogEntry {
            source: "app.log".into(),
            instant: 0,
            display_text: "00:00:00".into(),
            payload: "00:00:00 first\n  second\n".into(),
            line_number: 1,
        };
        let lines: Vec<_> = entry.lines().collect();
        assert_eq!(lines, vec!["00:00:00 first", "  second"]);
    }

    #[test]
    fn entry_serializes_to_json() {
        let entry = LogEntry {
            source: "app.log".into(),
            instant: 42,
            display_text: "00:00:00".into(),
            payload: "00:00:00 hi\n".into(),
            line_number: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["instant"], 42);
        assert_eq!(json["line_number"], 3);
        assert_eq!(json["source"], "app.log");
    }
}
