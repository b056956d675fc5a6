use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};

use crate::db::Store;

#[derive(Args, Clone, Debug)]
pub struct StoreConfig {
    #[arg(long, env = "CELL_COUNTS_DB_PATH", default_value = "cell_counts.db")]
    db_path: Utf8PathBuf,
}
impl StoreConfig {
    #[must_use]
    pub fn db_path(&self) -> &Utf8Path {
        &self.db_path
    }

    #[must_use]
    pub fn store(&self) -> Store {
        Store::new(self.db_path.clone())
    }
}

#[derive(Args, Clone, Debug)]
pub struct LoaderConfig {
    #[arg(long, env = "CELL_COUNTS_CSV_PATH", default_value = "cell-count.csv")]
    csv_path: Utf8PathBuf,
    #[command(flatten)]
    store: StoreConfig,
}
impl LoaderConfig {
    #[must_use]
    pub fn csv_path(&self) -> &Utf8Path {
        &self.csv_path
    }

    #[must_use]
    pub fn store(&self) -> Store {
        self.store.store()
    }
}

#[derive(Args, Clone, Debug)]
pub struct DashboardConfig {
    #[command(flatten)]
    store: StoreConfig,
    #[arg(long, env = "CELL_COUNTS_HOST", default_value_t = String::from("localhost"))]
    host: String,
    #[arg(long, env = "CELL_COUNTS_PORT", default_value_t = 8501)]
    port: u16,
}
impl DashboardConfig {
    #[must_use]
    pub fn app_address(&self) -> String {
        let Self { host, port, .. } = self;

        format!("{host}:{port}")
    }

    #[must_use]
    pub fn store(&self) -> Store {
        self.store.store()
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Load a cell-count CSV file into the cell_counts table")]
pub struct LoaderCli {
    #[command(flatten)]
    pub config: LoaderConfig,
    #[arg(long, env = "CELL_COUNTS_LOG_DIR")]
    pub log_dir: Option<Utf8PathBuf>,
}

#[derive(Parser, Debug)]
#[command(version, about = "Serve the immune cell population dashboard")]
pub struct DashboardCli {
    #[command(flatten)]
    pub config: DashboardConfig,
    #[arg(long, env = "CELL_COUNTS_LOG_DIR")]
    pub log_dir: Option<Utf8PathBuf>,
}
