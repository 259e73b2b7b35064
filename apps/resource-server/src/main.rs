use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use resource_server::{config, logging, server};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "resource-server", version, about = "Serve CRUD resources over HTTP")]
struct Cli {
    /// YAML configuration file, layered over the built-in defaults.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    if cli.print_config {
        let rendered =
            serde_json::to_string_pretty(&cfg).context("failed to render configuration")?;
        println!("{rendered}");
        return Ok(());
    }

    logging::init(&cfg.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting resource-server");

    let cancel = CancellationToken::new();
    tokio::spawn(server::wait_for_signal(cancel.clone()));
    server::serve(&cfg, cancel).await
}
