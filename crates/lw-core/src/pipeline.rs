//! Merge pipeline: validate, read every source, segment in parallel, merge.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::error::{ErrorKind, MergeError, MergeResult};
use crate::merge::MergedLog;
use crate::pattern::DEFAULT_PATTERN;
use crate::segmenter::{self, SegmentOptions};
use crate::source::LogSource;
use crate::types::TimestampSpec;

// ── Requests ──────────────────────────────────────────────────

/// Timestamp recognition settings before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampSettings {
    pub pattern: String,
    pub start_delimiter: Option<String>,
    pub end_delimiter: Option<String>,
}

impl TimestampSettings {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            start_delimiter: None,
            end_delimiter: None,
        }
    }

    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_delimiter = Some(start.into());
        self.end_delimiter = Some(end.into());
        self
    }

    pub fn build(&self) -> MergeResult<TimestampSpec> {
        TimestampSpec::from_parts(
            &self.pattern,
            self.start_delimiter.as_deref(),
            self.end_delimiter.as_deref(),
        )
    }
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

/// One source to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    /// Name handed to the [`LogSource`] backend (a path, or a memory label).
    pub name: String,
    /// Label shown in reports. Defaults to `name`.
    pub label: Option<String>,
    /// Signed clock correction in milliseconds.
    pub offset_ms: i64,
    /// Per-source override of the request's timestamp settings.
    pub timestamp: Option<TimestampSettings>,
}

impl SourceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            offset_ms: 0,
            timestamp: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_offset(mut self, offset_ms: i64) -> Self {
        self.offset_ms = offset_ms;
        self
    }

    pub fn with_timestamp(mut self, timestamp: TimestampSettings) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A complete merge invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequest {
    pub sources: Vec<SourceRequest>,
    pub timestamp: TimestampSettings,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub search_terms: Vec<String>,
    /// Skip sources that cannot be read instead of failing the merge.
    pub skip_unavailable: bool,
}

/// A validated source, ready to read and segment.
#[derive(Debug, Clone)]
struct SourcePlan {
    name: String,
    label: String,
    options: SegmentOptions,
}

impl MergeRequest {
    /// Compile every spec and window up front so no source is read when the
    /// configuration is bad. Repeated source names are planned once; two
    /// different sources may not share a label.
    fn plan(&self) -> MergeResult<Vec<SourcePlan>> {
        let default_spec = Arc::new(self.timestamp.build()?);
        let mut plans: Vec<SourcePlan> = Vec::with_capacity(self.sources.len());

        for request in &self.sources {
            if plans.iter().any(|p| p.name == request.name) {
                tracing::warn!(source = %request.name, "not processing duplicate source");
                continue;
            }

            if let Some(other) = plans.iter().find(|p| p.label == request.label()) {
                return Err(MergeError::DuplicateLabel {
                    label: other.label.clone(),
                    first: other.name.clone(),
                    second: request.name.clone(),
                });
            }

            let spec = match &request.timestamp {
                Some(settings) => Arc::new(settings.build()?),
                None => Arc::clone(&default_spec),
            };
            let options = SegmentOptions::new(spec)
                .with_window(self.start_at.as_deref(), self.end_at.as_deref())?
                .with_search_terms(self.search_terms.clone())
                .with_offset(request.offset_ms);

            plans.push(SourcePlan {
                name: request.name.clone(),
                label: request.label().to_string(),
                options,
            });
        }

        Ok(plans)
    }
}

// ── Pipeline ──────────────────────────────────────────────────

/// Drop the plans whose source is missing, or fail naming all of them.
async fn check_available(
    plans: Vec<SourcePlan>,
    source: &dyn LogSource,
    skip_unavailable: bool,
) -> MergeResult<Vec<SourcePlan>> {
    let mut available = Vec::with_capacity(plans.len());
    let mut missing = Vec::new();
    for plan in plans {
        if source.exists(&plan.name).await {
            available.push(plan);
        } else {
            tracing::warn!(source = %plan.name, "source cannot be accessed");
            missing.push(plan.name);
        }
    }

    if !missing.is_empty() && !skip_unavailable {
        return Err(MergeError::Unavailable(missing));
    }
    Ok(available)
}

/// Run a merge: validate, check every source, read, segment each source on a
/// blocking task, and merge the per-source lists in request order.
pub async fn run(request: &MergeRequest, source: &dyn LogSource) -> MergeResult<MergedLog> {
    let plans = request.plan()?;
    let plans = check_available(plans, source, request.skip_unavailable).await?;

    let mut loaded = Vec::with_capacity(plans.len());
    for plan in plans {
        match source.read_lines(&plan.name).await {
            Ok(lines) => {
                tracing::debug!(source = %plan.name, lines = lines.len(), "source read");
                loaded.push((plan, lines));
            }
            Err(e) if request.skip_unavailable && e.kind() == ErrorKind::SourceUnavailable => {
                tracing::warn!(source = %plan.name, error = %e, "skipping unavailable source");
            }
            Err(e) => return Err(e),
        }
    }

    let source_count = loaded.len();
    let mut tasks = JoinSet::new();
    for (index, (plan, lines)) in loaded.into_iter().enumerate() {
        tasks.spawn_blocking(move || {
            let entries = segmenter::segment(&plan.label, lines, &plan.options);
            (index, plan.label, entries)
        });
    }

    let mut per_source = vec![None; source_count];
    while let Some(joined) = tasks.join_next().await {
        let (index, label, entries) = joined.map_err(|e| MergeError::Task(e.to_string()))?;
        per_source[index] = Some((label, entries));
    }

    let per_source: Vec<_> = per_source.into_iter().flatten().collect();
    let merged = MergedLog::from_sources(per_source);

    tracing::info!(
        sources = merged.sources.len(),
        entries = merged.len(),
        "merge complete"
    );

    Ok(merged)
}
