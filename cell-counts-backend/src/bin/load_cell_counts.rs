use anyhow::Context;
use clap::Parser;
use cell_counts_backend::{config::LoaderCli, initialize_logging, loader};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().unwrap_or_default();
    let LoaderCli { config, log_dir } = LoaderCli::parse();

    initialize_logging(log_dir.as_deref());

    let csv_path = config.csv_path();
    let inserted = loader::run(csv_path, &config.store())
        .with_context(|| format!("failed to load {csv_path}"))?;
    tracing::info!(inserted, "done");

    Ok(())
}
