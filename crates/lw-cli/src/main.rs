//! logweave: view multiple log files as one time-ascending list.

use tracing_subscriber::EnvFilter;

use lw_cli::app;
use lw_cli::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::from_cli();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logweave starting");

    let config = args.load_config()?;
    app::run_files(&config).await
}
