//! Merge engine error types.

use thiserror::Error;

/// Which filter bound a [`MergeError::Bound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Start,
    End,
}

impl std::fmt::Display for BoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

/// Broad classification used by callers deciding whether to skip or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid pattern, bounds, delimiters or offsets. Raised before any segmentation.
    Configuration,
    /// A named source could not be opened or read.
    SourceUnavailable,
    /// A segmentation task failed to complete.
    Internal,
}

/// Errors that can occur while configuring or running a merge.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid timestamp pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("{bound} filter '{value}' does not match timestamp pattern '{pattern}'")]
    Bound {
        bound: BoundKind,
        value: String,
        pattern: String,
    },

    #[error("invalid range: start filter '{start}' is later than end filter '{end}'")]
    Range { start: String, end: String },

    #[error("invalid timestamp spec: {0}")]
    Spec(String),

    #[error("invalid timestamp offsets '{0}'")]
    Offsets(String),

    #[error("duplicate source label '{label}' for '{first}' and '{second}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("source not found: {0}")]
    NotFound(String),

    #[error("sources cannot be accessed: {}", .0.join(", "))]
    Unavailable(Vec<String>),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("segmentation task failed: {0}")]
    Task(String),
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pattern { .. }
            | Self::Bound { .. }
            | Self::Range { .. }
            | Self::Spec(_)
            | Self::Offsets(_)
            | Self::DuplicateLabel { .. } => ErrorKind::Configuration,
            Self::NotFound(_) | Self::Unavailable(_) | Self::Io(_) => {
                ErrorKind::SourceUnavailable
            }
            Self::Task(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience alias for merge engine results.
pub type MergeResult<T> = Result<T, MergeError>;
