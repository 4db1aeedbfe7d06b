//! Multi-source merger: one stable, time-ascending sequence.

use serde::Serialize;

use crate::types::LogEntry;

/// Concatenate per-source lists in order and stable-sort by instant.
///
/// Entries with equal instants keep their concatenation order: earlier
/// source first, then file order within a source.
pub fn merge(per_source: Vec<Vec<LogEntry>>) -> Vec<LogEntry> {
    let total = per_source.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for entries in per_source {
        merged.extend(entries);
    }
    merged.sort_by_key(|e| e.instant);
    merged
}

/// The merged sequence plus the distinct source labels used for numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedLog {
    /// Distinct source labels in first-seen order.
    pub sources: Vec<String>,
    /// Entries ordered by instant.
    pub entries: Vec<LogEntry>,
}

impl MergedLog {
    /// Merge labelled per-source lists. Labels are deduplicated, keeping the
    /// first occurrence, so repeated labels share one index.
    pub fn from_sources(per_source: Vec<(String, Vec<LogEntry>)>) -> Self {
        let mut sources: Vec<String> = Vec::with_capacity(per_source.len());
        let mut lists = Vec::with_capacity(per_source.len());

        for (label, entries) in per_source {
            if !sources.contains(&label) {
                sources.push(label);
            }
            lists.push(entries);
        }

        Self {
            sources,
            entries: merge(lists),
        }
    }

    /// 1-based legend index of `source`.
    pub fn source_index(&self, source: &str) -> Option<usize> {
        self.sources.iter().position(|s| s == source).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
