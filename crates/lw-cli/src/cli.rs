//! Command-line arguments and their overlay on the file configuration.

use clap::Parser;

use lw_core::offset;

use crate::config::{MergeConfig, OutputFormat, SourceConfig, dedup_sources};

/// logweave - view multiple log files as one time-ascending list
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "logweave")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log files to merge (replace any sources from the config file)
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Timestamp pattern, e.g. "yyyy-MM-dd HH:mm:ss,SSS" or "%H:%M:%S"
    #[arg(short = 't', long = "timestamp-format", value_name = "PATTERN")]
    pub timestamp_format: Option<String>,

    /// Text that opens the timestamp (requires --end-delimiter)
    #[arg(long, value_name = "TEXT")]
    pub start_delimiter: Option<String>,

    /// Text that closes the timestamp (requires --start-delimiter)
    #[arg(long, value_name = "TEXT")]
    pub end_delimiter: Option<String>,

    /// Earliest timestamp to keep (inclusive)
    #[arg(short = 's', long = "start", value_name = "TS")]
    pub start: Option<String>,

    /// Latest timestamp to keep (inclusive)
    #[arg(short = 'e', long = "end", value_name = "TS")]
    pub end: Option<String>,

    /// Keep entries containing this text (case sensitive, repeatable)
    #[arg(short = 'f', long = "find", value_name = "TEXT")]
    pub find: Vec<String>,

    /// Millisecond offsets per file, e.g. "0,-250,1200"
    #[arg(short = 'a', long = "adjust", value_name = "N,N", allow_hyphen_values = true)]
    pub adjust: Option<String>,

    /// Text shown at the top of the report
    #[arg(long)]
    pub label: Option<String>,

    /// Emit one JSON object per entry instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Skip files that cannot be read instead of failing
    #[arg(long)]
    pub skip_unavailable: bool,
}

impl Args {
    pub fn from_cli() -> Self {
        <Self as Parser>::parse()
    }

    /// Load the config file (if any) and overlay every flag that was given.
    pub fn load_config(&self) -> anyhow::Result<MergeConfig> {
        let config = match &self.config {
            Some(path) => {
                let config = MergeConfig::from_file(path)?;
                tracing::info!(path = %path, sources = config.sources.len(), "config loaded");
                config
            }
            None => MergeConfig::default(),
        };
        self.apply(config)
    }

    /// Command-line values override file values.
    pub fn apply(&self, mut config: MergeConfig) -> anyhow::Result<MergeConfig> {
        if !self.files.is_empty() {
            config.sources = self.files.iter().map(SourceConfig::new).collect();
        }
        config.sources = dedup_sources(config.sources);
        if let Some(pattern) = &self.timestamp_format {
            config.timestamp_pattern = pattern.clone();
        }
        if self.start_delimiter.is_some() || self.end_delimiter.is_some() {
            config.start_delimiter = self.start_delimiter.clone();
            config.end_delimiter = self.end_delimiter.clone();
        }
        if self.start.is_some() {
            config.start_at = self.start.clone();
        }
        if self.end.is_some() {
            config.end_at = self.end.clone();
        }
        if !self.find.is_empty() {
            config.search = self.find.clone();
        }
        if let Some(adjust) = &self.adjust {
            config.offsets = offset::parse_offsets(config.sources.len(), Some(adjust))?;
            for source in &mut config.sources {
                source.offset_ms = None;
            }
        }
        if self.label.is_some() {
            config.label = self.label.clone();
        }
        if self.json {
            config.output = OutputFormat::Json;
        }
        if self.skip_unavailable {
            config.skip_unavailable = true;
        }
        Ok(config)
    }
}
