use clap::Parser;
use cell_counts_backend::{config::DashboardCli, initialize_logging, server};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().unwrap_or_default();
    let DashboardCli { config, log_dir } = DashboardCli::parse();

    initialize_logging(log_dir.as_deref());

    server::serve(config).await
}
