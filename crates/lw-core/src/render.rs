//! Report renderers for a merged log.

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::merge::MergedLog;
use crate::types::LogEntry;

/// Writes a merged log to an output sink.
pub trait ReportWriter: Send + Sync {
    /// Short format name, as accepted by [`ReportFormat::from_str`].
    fn name(&self) -> &str;

    /// Render `log` into `out`.
    fn write_report(&self, log: &MergedLog, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Available report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    pub fn writer(self, label: Option<String>) -> Box<dyn ReportWriter> {
        match self {
            Self::Text => Box::new(TextReport::new(label)),
            Self::Json => Box::new(JsonReport),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" | "jsonl" => Ok(Self::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

// ── Text Report ───────────────────────────────────────────────

/// Column-aligned report with a source legend.
///
/// Each entry's first line is prefixed with a marker (`*` when the source
/// changed from the previous entry, `.` otherwise), the 1-based source index,
/// the millisecond delta from the previous entry and the timestamp text.
/// Continuation lines repeat the index with `.` placeholders.
#[derive(Debug, Clone, Default)]
pub struct TextReport {
    label: Option<String>,
}

impl TextReport {
    pub fn new(label: Option<String>) -> Self {
        Self { label }
    }
}

impl ReportWriter for TextReport {
    fn name(&self) -> &str {
        "text"
    }

    fn write_report(&self, log: &MergedLog, out: &mut dyn Write) -> std::io::Result<()> {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            writeln!(out, "# Label: {label}")?;
        }

        writeln!(out, "# Sources:")?;
        for (i, source) in log.sources.iter().enumerate() {
            writeln!(out, "# {:2} {}", i + 1, source)?;
        }
        writeln!(out, "#")?;
        writeln!(out, "# Time sorted log entries:")?;

        let mut last_index = None;
        let mut last_instant = None;

        for entry in &log.entries {
            let index = log.source_index(&entry.source).unwrap_or(0);
            let delta = last_instant.map_or(0, |prev: i64| entry.instant.saturating_sub(prev));
            let marker = if last_index == Some(index) { '.' } else { '*' };
            last_index = Some(index);
            last_instant = Some(entry.instant);

            write_entry(out, entry, marker, index, delta)?;
        }

        Ok(())
    }
}

fn write_entry(
    out: &mut dyn Write,
    entry: &LogEntry,
    marker: char,
    index: usize,
    delta: i64,
) -> std::io::Result<()> {
    let mut lines = entry.lines();
    if let Some(first) = lines.next() {
        writeln!(
            out,
            "{marker}{index:2}{delta:9} {:>20}{first}",
            entry.display_text
        )?;
    }
    for line in lines {
        writeln!(out, ".{index:2}{:>9} {:<20}{line}", ".", ".")?;
    }
    Ok(())
}

// ── JSON Report ───────────────────────────────────────────────

/// One JSON object per entry, newline separated.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

#[derive(Serialize)]
struct JsonRecord<'a> {
    source_index: usize,
    source: &'a str,
    instant: i64,
    display_text: &'a str,
    line_number: usize,
    payload: &'a str,
}

impl ReportWriter for JsonReport {
    fn name(&self) -> &str {
        "json"
    }

    fn write_report(&self, log: &MergedLog, out: &mut dyn Write) -> std::io::Result<()> {
        for entry in &log.entries {
            let record = JsonRecord {
                source_index: log.source_index(&entry.source).unwrap_or(0),
                source: &entry.source,
                instant: entry.instant,
                display_text: &entry.display_text,
                line_number: entry.line_number,
                payload: &entry.payload,
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
