//! In-memory log source: caller-supplied line lists under a label.

use async_trait::async_trait;

use crate::error::{MergeError, MergeResult};
use crate::source::LogSource;

/// A log source that serves pre-loaded lines by label.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSource {
    sources: Vec<(String, Vec<String>)>,
}

impl MemoryLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a source with the given lines.
    pub fn add_source<I, S>(&mut self, label: impl Into<String>, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = label.into();
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        match self.sources.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = lines,
            None => self.sources.push((label, lines)),
        }
    }

    /// Builder form of [`add_source`](Self::add_source).
    pub fn with_source<I, S>(mut self, label: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_source(label, lines);
        self
    }

    /// Two application servers whose bracketed logs interleave, with a
    /// multi-line stack trace on the second.
    pub fn with_cluster_sample() -> Self {
        Self::new()
            .with_source(
                "app-01.log",
                [
                    "[2016-05-16 03:34:56,789] INFO  Starting request router",
                    "[2016-05-16 03:35:01,002] INFO  Listening on :8080",
                    "[2016-05-16 03:35:07,450] WARN  Slow upstream: orders (1200ms)",
                    "[2016-05-16 03:35:09,001] INFO  Request complete id=42",
                ],
            )
            .with_source(
                "app-02.log",
                [
                    "JVM banner line that precedes any timestamp",
                    "[2016-05-16 03:34:58,120] INFO  Starting order service",
                    "[2016-05-16 03:35:07,449] ERROR Query failed",
                    "java.sql.SQLTimeoutException: timeout after 1000ms",
                    "    at db.Pool.query(Pool.java:88)",
                    "[2016-05-16 03:35:09,001] INFO  Retry succeeded id=42",
                ],
            )
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn read_lines(&self, name: &str) -> MergeResult<Vec<String>> {
        self.sources
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, lines)| lines.clone())
            .ok_or_else(|| MergeError::NotFound(name.to_string()))
    }

    async fn exists(&self, name: &str) -> bool {
        self.sources.iter().any(|(label, _)| label == name)
    }
}
