//! Shared test harness for E2E integration tests.
//!
//! Writes log files into a scratch directory and drives them through the
//! same `app::run` path the `logweave` binary uses.

#![allow(dead_code)]

use chrono::DateTime;
use tempfile::TempDir;

use lw_cli::app;
use lw_cli::config::{MergeConfig, SourceConfig};
use lw_core::{FileLogSource, LogSource, MergedLog};

/// Default bracketed timestamp rendering, `[yyyy-MM-dd HH:mm:ss,SSS]`.
pub fn stamp(ms: i64) -> String {
    let dt = DateTime::from_timestamp_millis(ms).unwrap();
    format!("[{}]", dt.format("%Y-%m-%d %H:%M:%S,%3f"))
}

/// One line per `(instant, text)`, stamped with [`stamp`].
pub fn stamped(entries: &[(i64, &str)]) -> Vec<String> {
    entries
        .iter()
        .map(|(ms, text)| format!("{} {text}", stamp(*ms)))
        .collect()
}

/// End-to-end harness backed by a temporary directory.
pub struct TestHarness {
    dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `lines` to `name` inside the scratch directory; returns its path.
    pub fn write_log<S: AsRef<str>>(&self, name: &str, lines: &[S]) -> String {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        self.write_raw(name, content.as_bytes())
    }

    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path.to_str().unwrap().to_string()
    }

    /// Path inside the scratch directory that was never written.
    pub fn missing(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }

    /// Bracketed default-pattern config over `paths`.
    pub fn config(&self, paths: &[String]) -> MergeConfig {
        MergeConfig {
            start_delimiter: Some("[".into()),
            end_delimiter: Some("]".into()),
            sources: paths.iter().map(SourceConfig::new).collect(),
            ..Default::default()
        }
    }

    /// Run a merge over files on disk; returns the merged log and the report.
    pub async fn run(&self, config: &MergeConfig) -> anyhow::Result<(MergedLog, String)> {
        run_with(config, &FileLogSource).await
    }
}

/// Run a merge against any source backend.
pub async fn run_with(
    config: &MergeConfig,
    source: &dyn LogSource,
) -> anyhow::Result<(MergedLog, String)> {
    let mut out = Vec::new();
    let log = app::run(config, source, &mut out).await?;
    Ok((log, String::from_utf8(out).unwrap()))
}
