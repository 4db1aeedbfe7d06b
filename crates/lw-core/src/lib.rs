//! Multi-source log merge engine.
//!
//! Splits each source's lines into timestamp-anchored entries (a timestamp
//! line plus its continuation lines), corrects per-source clock offsets,
//! filters by time window and search terms, and merges every source into one
//! stable, time-ascending sequence. A `LogSource` abstraction keeps file and
//! in-memory inputs interchangeable, and `render` turns the result into a
//! text or JSON-lines report.

pub mod error;
pub mod filter;
pub mod matcher;
pub mod memory;
pub mod merge;
pub mod offset;
pub mod pattern;
pub mod pipeline;
pub mod render;
pub mod segmenter;
pub mod source;
pub mod types;

// Re-export key types for convenience
pub use error::{ErrorKind, MergeError, MergeResult};
pub use filter::{EntryFilter, TimeWindow};
pub use matcher::match_timestamp;
pub use memory::MemoryLogSource;
pub use merge::{MergedLog, merge};
pub use pattern::{DEFAULT_PATTERN, TimestampFormat};
pub use pipeline::{MergeRequest, SourceRequest, TimestampSettings};
pub use render::{JsonReport, ReportFormat, ReportWriter, TextReport};
pub use segmenter::{SegmentOptions, segment};
pub use source::{FileLogSource, LogSource};
pub use types::{LINE_SEP, LogEntry, TimestampMatch, TimestampSpec};
