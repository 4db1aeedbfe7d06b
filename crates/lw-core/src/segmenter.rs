//! Entry segmenter: group one source's lines into timestamp-anchored entries.

use std::sync::Arc;

use crate::error::MergeResult;
use crate::filter::{EntryFilter, TimeWindow};
use crate::offset;
use crate::types::{LINE_SEP, LogEntry, TimestampSpec};

/// Everything one source needs to be segmented: how to find timestamps,
/// which entries to keep, and the clock correction to apply.
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    pub spec: Arc<TimestampSpec>,
    pub filter: EntryFilter,
    pub offset_ms: i64,
}

impl SegmentOptions {
    pub fn new(spec: impl Into<Arc<TimestampSpec>>) -> Self {
        Self {
            spec: spec.into(),
            filter: EntryFilter::pass_all(),
            offset_ms: 0,
        }
    }

    /// Restrict to `[start_at, end_at]`, parsed with this source's pattern.
    pub fn with_window(mut self, start_at: Option<&str>, end_at: Option<&str>) -> MergeResult<Self> {
        let window = TimeWindow::parse(&self.spec, start_at, end_at)?;
        self.filter = self.filter.with_window(window);
        Ok(self)
    }

    pub fn with_search_terms(mut self, terms: Vec<String>) -> Self {
        self.filter = self.filter.with_search_terms(terms);
        self
    }

    pub fn with_offset(mut self, offset_ms: i64) -> Self {
        self.offset_ms = offset_ms;
        self
    }
}

/// Segment `lines` from `source` into entries, then offset-correct and filter.
///
/// Lines before the first recognized timestamp are dropped. Every later line
/// belongs to the entry opened by the closest timestamp line above it.
pub fn segment(source: &str, lines: Vec<String>, options: &SegmentOptions) -> Vec<LogEntry> {
    let boundaries: Vec<(usize, i64, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            options
                .spec
                .match_line(line)
                .map(|m| (i, m.instant, m.display_text))
        })
        .collect();

    let dropped = boundaries.first().map_or(lines.len(), |(i, _, _)| *i);
    if dropped > 0 {
        tracing::debug!(source, dropped, "discarded lines before first timestamp");
    }

    let mut entries = Vec::with_capacity(boundaries.len());
    let mut filtered = 0usize;

    for (n, (first, raw_instant, display_text)) in boundaries.iter().enumerate() {
        let last = boundaries.get(n + 1).map_or(lines.len(), |(next, _, _)| *next);

        let mut payload = String::new();
        for line in &lines[*first..last] {
            payload.push_str(line);
            payload.push_str(LINE_SEP);
        }

        let entry = LogEntry {
            source: source.to_string(),
            instant: offset::adjust(*raw_instant, options.offset_ms),
            display_text: display_text.clone(),
            payload,
            line_number: first + 1,
        };

        if options.filter.passes(&entry) {
            entries.push(entry);
        } else {
            filtered += 1;
        }
    }

    tracing::debug!(
        source,
        lines = lines.len(),
        boundaries = boundaries.len(),
        kept = entries.len(),
        filtered,
        "source segmented"
    );

    entries
}
