use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use cell_counts_core::dashboard::LoadOutcome;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;

use crate::{
    config::DashboardConfig,
    db::{self, Store, cache::DataCache},
};

mod dashboard;
mod render;

/// # Errors
pub async fn serve(config: DashboardConfig) -> anyhow::Result<()> {
    let app_addr = config.app_address();

    let app_state = AppState::new(config.store());
    tracing::info!(path = %app_state.store.path(), "initialized app state");

    let app = app(app_state);

    let listener = TcpListener::bind(&app_addr)
        .await
        .context(format!("failed to listen on {app_addr}"))?;
    tracing::info!("cell counts dashboard listening on {app_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("failed to serve app")?;

    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    cache: Arc<DataCache>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(DataCache::new()),
        }
    }

    async fn load(&self) -> LoadOutcome {
        let Self { store, cache } = self.clone();

        tokio::task::spawn_blocking(move || cache.load(&store))
            .await
            .unwrap_or_else(|err| LoadOutcome::AccessError(err.to_string()))
    }

    /// Writes the demo dataset if, and only if, the store does not exist yet.
    /// Returns the number of rows written, or `None` if the store was left
    /// alone.
    async fn create_demo(&self) -> db::error::Result<Option<usize>> {
        let Self { store, cache } = self.clone();

        tokio::task::spawn_blocking(move || {
            if store.exists() {
                tracing::warn!(path = %store.path(), "refusing to overwrite existing store with demo data");
                return Ok(None);
            }

            let inserted = store.create_demo()?;
            cache.invalidate();

            Ok(Some(inserted))
        })
        .await
        .map_err(|err| db::error::Error::Other {
            message: err.to_string(),
        })?
    }
}

pub fn app(app_state: AppState) -> Router {
    dashboard::router()
        .layer(TraceLayer::new_for_http())
        .route("/health", get(async || ()))
        .with_state(app_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down");
}
