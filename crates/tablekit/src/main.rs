//! tablekit CLI entry point.

use anyhow::Result;
use clap::Parser;
use tablekit::cli::Cli;
use tablekit::commands;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.is_verbose() {
        "tablekit=debug"
    } else {
        "tablekit=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    commands::run(cli).await?;
    Ok(())
}
