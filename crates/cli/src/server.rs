//! HTTP surface: shared state, router and the serve loop.

use crate::handlers;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use labeler_core::config::AppConfig;
use labeler_core::labeler::Labeler;
use labeler_core::store::{ensure_dir, ImageStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Immutable per-process state shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ImageStore,
    pub labeler: Labeler,
    pub page_size: usize,
}

impl AppState {
    /// Builds the store and labeler from config and creates the labeled
    /// folder if it does not exist yet.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        cfg.validate()?;
        let store = ImageStore::new(cfg.images.root_dir(), &cfg.images.exclude)?;
        let labeled_dir = cfg.images.labeled_dir();
        ensure_dir(&labeled_dir)
            .with_context(|| format!("Failed to create labeled folder {:?}", labeled_dir))?;
        let labeler = Labeler::new(store.clone(), labeled_dir)
            .validate_before_move(cfg.labeling.validate_before_move);
        Ok(Self {
            store,
            labeler,
            page_size: cfg.images.page_size,
        })
    }
}

pub fn router(state: Arc<AppState>, cors: bool) -> Router {
    let mut router = Router::new()
        .route("/images", get(handlers::list_images))
        .route("/image/:name", get(handlers::get_image))
        .route("/label-image", post(handlers::label_image))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

pub struct Server {
    addr: SocketAddr,
    cors: bool,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let addr: SocketAddr = cfg
            .server
            .addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", cfg.server.addr))?;
        let state = AppState::from_config(cfg)?;
        Ok(Self {
            addr,
            cors: cfg.server.cors,
            state: Arc::new(state),
        })
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!(
            addr = %self.addr,
            images = ?self.state.store.root(),
            labeled = ?self.state.labeler.labeled_dir(),
            "Starting labeler server"
        );
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", self.addr))?;

        axum::serve(listener, router(self.state, self.cors))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
