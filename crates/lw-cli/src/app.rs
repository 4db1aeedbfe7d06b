//! Wires configuration, the merge pipeline and the report writer together.

use std::io::Write;

use anyhow::Context;

use lw_core::{FileLogSource, LogSource, MergedLog, ReportFormat, pipeline};

use crate::config::MergeConfig;

/// Merge the configured sources and write the report to `out`.
pub async fn run(
    config: &MergeConfig,
    source: &dyn LogSource,
    out: &mut dyn Write,
) -> anyhow::Result<MergedLog> {
    if config.sources.is_empty() {
        anyhow::bail!("no log files given");
    }

    let request = config.to_request();
    let log = pipeline::run(&request, source)
        .await
        .context("merge failed")?;

    let format: ReportFormat = config.output.into();
    let writer = format.writer(config.label.clone());
    writer.write_report(&log, out)?;
    out.flush()?;

    tracing::debug!(
        format = writer.name(),
        entries = log.len(),
        "report written"
    );

    Ok(log)
}

/// Merge files from disk and print the report on stdout.
pub async fn run_files(config: &MergeConfig) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    run(config, &FileLogSource, &mut out).await?;
    Ok(())
}
