use camino::Utf8Path;

pub mod config;
pub mod db;
pub mod loader;
pub mod server;

#[cfg(test)]
mod test_util;

/// Installs the global `tracing` subscriber. Without a log directory, events
/// are pretty-printed to stderr; with one, they are written as JSON to a file
/// that rolls over daily.
pub fn initialize_logging(log_dir: Option<&Utf8Path>) {
    use tracing::Level;
    use tracing_subscriber::{filter::Targets, prelude::*};

    let log_layer = tracing_subscriber::fmt::layer();

    match log_dir {
        None => {
            let dev_log_filter = Targets::new()
                .with_target("cell_counts_backend", Level::DEBUG)
                .with_target("load_cell_counts", Level::DEBUG)
                .with_target("cell_counts_dashboard", Level::DEBUG)
                .with_target("tower_http", Level::TRACE);
            let log_layer = log_layer
                .pretty()
                .with_writer(std::io::stderr)
                .with_filter(dev_log_filter);

            tracing_subscriber::registry().with(log_layer).init();
        }
        Some(path) => {
            let log_writer = tracing_appender::rolling::daily(path, "cell-counts.log");
            let prod_log_filter = Targets::new()
                .with_target("cell_counts_backend", Level::INFO)
                .with_target("load_cell_counts", Level::INFO)
                .with_target("cell_counts_dashboard", Level::INFO)
                .with_target("tower_http", Level::INFO);
            let log_layer = log_layer
                .json()
                .with_writer(log_writer)
                .with_filter(prod_log_filter);

            tracing_subscriber::registry().with(log_layer).init();
        }
    }
}
