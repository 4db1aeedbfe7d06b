//! Merge configuration, loadable from TOML.

use serde::Deserialize;

use lw_core::{DEFAULT_PATTERN, MergeRequest, ReportFormat, SourceRequest, TimestampSettings};

/// Report format selected in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Top-level configuration for a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeConfig {
    /// Free text shown at the top of the text report.
    #[serde(default)]
    pub label: Option<String>,
    /// Timestamp pattern shared by sources without their own.
    #[serde(default = "default_timestamp_pattern")]
    pub timestamp_pattern: String,
    /// Delimiter pair around the timestamp. Both or neither.
    #[serde(default)]
    pub start_delimiter: Option<String>,
    #[serde(default)]
    pub end_delimiter: Option<String>,
    /// Inclusive window bounds, written in the timestamp pattern.
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    /// Keep only entries containing at least one of these terms.
    #[serde(default)]
    pub search: Vec<String>,
    /// Millisecond offsets by source position; missing positions are 0.
    #[serde(default)]
    pub offsets: Vec<i64>,
    #[serde(default)]
    pub skip_unavailable: bool,
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One `[[sources]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Overrides the positional `offsets` entry for this source.
    #[serde(default)]
    pub offset_ms: Option<i64>,
    #[serde(default)]
    pub timestamp_pattern: Option<String>,
    #[serde(default)]
    pub start_delimiter: Option<String>,
    #[serde(default)]
    pub end_delimiter: Option<String>,
}

fn default_timestamp_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            label: None,
            timestamp_pattern: default_timestamp_pattern(),
            start_delimiter: None,
            end_delimiter: None,
            start_at: None,
            end_at: None,
            search: Vec::new(),
            offsets: Vec::new(),
            skip_unavailable: false,
            output: OutputFormat::default(),
            sources: Vec::new(),
        }
    }
}

impl SourceConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: None,
            offset_ms: None,
            timestamp_pattern: None,
            start_delimiter: None,
            end_delimiter: None,
        }
    }

    /// Per-source timestamp settings, if any field is overridden. Fields left
    /// unset fall back to the top-level values.
    fn timestamp(&self, defaults: &TimestampSettings) -> Option<TimestampSettings> {
        if self.timestamp_pattern.is_none()
            && self.start_delimiter.is_none()
            && self.end_delimiter.is_none()
        {
            return None;
        }
        Some(TimestampSettings {
            pattern: self
                .timestamp_pattern
                .clone()
                .unwrap_or_else(|| defaults.pattern.clone()),
            start_delimiter: self
                .start_delimiter
                .clone()
                .or_else(|| defaults.start_delimiter.clone()),
            end_delimiter: self
                .end_delimiter
                .clone()
                .or_else(|| defaults.end_delimiter.clone()),
        })
    }
}

/// Keep the first source for each path, so positional offsets count
/// distinct files only.
pub fn dedup_sources(sources: Vec<SourceConfig>) -> Vec<SourceConfig> {
    let mut unique: Vec<SourceConfig> = Vec::with_capacity(sources.len());
    for source in sources {
        if unique.iter().any(|s| s.path == source.path) {
            tracing::warn!(path = %source.path, "not processing duplicate file");
        } else {
            unique.push(source);
        }
    }
    unique
}

impl MergeConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build the engine request. Validation happens in the engine.
    pub fn to_request(&self) -> MergeRequest {
        let timestamp = TimestampSettings {
            pattern: self.timestamp_pattern.clone(),
            start_delimiter: self.start_delimiter.clone(),
            end_delimiter: self.end_delimiter.clone(),
        };

        let sources = dedup_sources(self.sources.clone())
            .into_iter()
            .enumerate()
            .map(|(i, source)| SourceRequest {
                timestamp: source.timestamp(&timestamp),
                offset_ms: source
                    .offset_ms
                    .unwrap_or_else(|| self.offsets.get(i).copied().unwrap_or(0)),
                name: source.path,
                label: source.label,
            })
            .collect();

        MergeRequest {
            sources,
            timestamp,
            start_at: self.start_at.clone(),
            end_at: self.end_at.clone(),
            search_terms: self.search.clone(),
            skip_unavailable: self.skip_unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_config() {
        let toml = r#"
[[sources]]
path = "/var/log/app.log"
"#;
        let config: MergeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.timestamp_pattern, "yyyy-MM-dd HH:mm:ss,SSS"); // default
        assert_eq!(config.output, OutputFormat::Text); // default
        assert!(!config.skip_unavailable);
        assert!(config.start_delimiter.is_none());
        assert_eq!(config.sources.len(), 1);
        assert!(config.sources[0].label.is_none());
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
label = "checkout incident"
timestamp_pattern = "yyyy-MM-dd HH:mm:ss.SSS"
start_delimiter = "["
end_delimiter = "]"
start_at = "2024-01-15 11:00:00.000"
end_at = "2024-01-15 13:00:00.000"
search = ["ERROR", "timeout"]
offsets = [0, -250]
skip_unavailable = true
output = "json"

[[sources]]
path = "/var/log/web.log"
label = "web"

[[sources]]
path = "/var/log/db.log"

[[sources]]
path = "/var/log/batch.log"
offset_ms = 1500
timestamp_pattern = "HH:mm:ss"
"#;
        let config: MergeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.label.as_deref(), Some("checkout incident"));
        assert_eq!(config.search, vec!["ERROR", "timeout"]);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.skip_unavailable);
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[2].offset_ms, Some(1500));
    }

    #[test]
    fn unknown_output_is_rejected() {
        let result: Result<MergeConfig, _> = toml::from_str(r#"output = "xml""#);
        assert!(result.is_err());
    }

    #[test]
    fn request_offsets_by_position_and_override() {
        let config = MergeConfig {
            offsets: vec![100, -250],
            sources: vec![
                SourceConfig::new("a.log"),
                SourceConfig::new("b.log"),
                SourceConfig {
                    offset_ms: Some(7),
                    ..SourceConfig::new("c.log")
                },
                SourceConfig::new("d.log"),
            ],
            ..Default::default()
        };
        let request = config.to_request();
        let offsets: Vec<_> = request.sources.iter().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![100, -250, 7, 0]);
    }

    #[test]
    fn request_offsets_skip_duplicate_paths() {
        let config = MergeConfig {
            offsets: vec![1, 2, 3],
            sources: vec![
                SourceConfig::new("a.log"),
                SourceConfig::new("a.log"),
                SourceConfig::new("b.log"),
            ],
            ..Default::default()
        };
        let request = config.to_request();
        let got: Vec<_> = request
            .sources
            .iter()
            .map(|s| (s.name.as_str(), s.offset_ms))
            .collect();
        assert_eq!(got, vec![("a.log", 1), ("b.log", 2)]);
    }

    #[test]
    fn request_source_timestamp_inherits_delimiters() {
        let config = MergeConfig {
            start_delimiter: Some("[".into()),
            end_delimiter: Some("]".into()),
            sources: vec![
                SourceConfig::new("a.log"),
                SourceConfig {
                    timestamp_pattern: Some("HH:mm:ss".into()),
                    ..SourceConfig::new("b.log")
                },
            ],
            ..Default::default()
        };
        let request = config.to_request();
        assert!(request.sources[0].timestamp.is_none());

        let b = request.sources[1].timestamp.as_ref().unwrap();
        assert_eq!(b.pattern, "HH:mm:ss");
        assert_eq!(b.start_delimiter.as_deref(), Some("["));
        assert_eq!(b.end_delimiter.as_deref(), Some("]"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.toml");
        std::fs::write(&path, "search = [\"WARN\"]\n").unwrap();

        let config = MergeConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.search, vec!["WARN"]);
        assert!(MergeConfig::from_file("/nonexistent/merge.toml").is_err());
    }
}
