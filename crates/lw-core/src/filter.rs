//! Entry filter: inclusive time window plus match-any search terms.

use crate::error::{BoundKind, MergeError, MergeResult};
use crate::types::{LogEntry, TimestampSpec};

/// Inclusive time window over corrected instants. `None` is an open side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeWindow {
    /// Parse window bounds with the source's bare timestamp pattern.
    ///
    /// Blank bounds are open. A bound that does not parse, or a start later
    /// than the end, is a configuration error.
    pub fn parse(
        spec: &TimestampSpec,
        start_at: Option<&str>,
        end_at: Option<&str>,
    ) -> MergeResult<Self> {
        let start = parse_bound(spec, BoundKind::Start, start_at)?;
        let end = parse_bound(spec, BoundKind::End, end_at)?;

        if let (Some(s), Some(e)) = (start, end)
            && s > e
        {
            return Err(MergeError::Range {
                start: start_at.unwrap_or_default().to_string(),
                end: end_at.unwrap_or_default().to_string(),
            });
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: i64) -> bool {
        self.start.is_none_or(|s| instant >= s) && self.end.is_none_or(|e| instant <= e)
    }
}

fn parse_bound(
    spec: &TimestampSpec,
    bound: BoundKind,
    value: Option<&str>,
) -> MergeResult<Option<i64>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let format = spec.format();
    format
        .parse_millis(value)
        .map(Some)
        .ok_or_else(|| MergeError::Bound {
            bound,
            value: value.to_string(),
            pattern: format.pattern().to_string(),
        })
}

/// Retention predicate applied to every segmented entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    window: TimeWindow,
    search_terms: Vec<String>,
}

impl EntryFilter {
    /// A filter that keeps everything.
    pub fn pass_all() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_search_terms(mut self, terms: Vec<String>) -> Self {
        self.search_terms = terms;
        self
    }

    /// Both the window and the search predicate must hold.
    pub fn passes(&self, entry: &LogEntry) -> bool {
        self.window.contains(entry.instant) && self.matches_search(&entry.payload)
    }

    /// Case-sensitive substring match against any term; no terms matches all.
    pub fn matches_search(&self, payload: &str) -> bool {
        self.search_terms.is_empty() || self.search_terms.iter().any(|t| payload.contains(t.as_str()))
    }
}
