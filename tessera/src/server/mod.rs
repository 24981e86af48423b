//! HTTP front end for the drawing pipeline.
//!
//! Serves the drawing page at `/` and accepts submissions at
//! `POST /process_drawing`.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;
use crate::storage::{StorageLayout, TileStore};

/// Handle to a running server.
pub struct ServerHandle {
    bound_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server actually bound to.
    pub fn bound_addr(&self) -> SocketAddr {
        self.bound_addr
    }

    /// Stops accepting connections and waits for in-flight requests to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        // The receiver may already be gone if the server died on its own.
        let _ = self.shutdown.send(true);
        self.join.await.context("server task failed")?;
        Ok(())
    }
}

fn build_app<S: TileStore + 'static>(
    pipeline: Arc<Pipeline<S>>,
    max_body_bytes: usize,
) -> Router {
    Router::new()
        .route(
            "/",
            get(routes::index).options(|| async { routes::allow(routes::INDEX_ALLOW) }),
        )
        .route(
            "/process_drawing",
            post(routes::process_drawing::<S>)
                .options(|| async { routes::allow(routes::PROCESS_ALLOW) }),
        )
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(routes::log_request))
        .with_state(pipeline)
}

/// Builds a filesystem pipeline from `config` and starts serving it.
pub async fn start_server(config: &ServerConfig) -> anyhow::Result<ServerHandle> {
    let layout = StorageLayout::new(&config.storage_root);
    std::fs::create_dir_all(layout.root())
        .with_context(|| format!("Failed to create storage root {}", layout.root().display()))?;

    config.tile_size().validate()?;
    let pipeline = Pipeline::open(layout, config.tile_size())
        .context("Failed to scan previous submissions")?;

    start_server_with(config, Arc::new(pipeline)).await
}

pub async fn start_server_with<S: TileStore + 'static>(
    config: &ServerConfig,
    pipeline: Arc<Pipeline<S>>,
) -> anyhow::Result<ServerHandle> {
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    let bound_addr = listener.local_addr()?;

    let app = build_app(pipeline, config.max_body_bytes);
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await;
        if let Err(e) = served {
            warn!("server stopped with error: {}", e);
        }
    });

    info!(bound_addr = %bound_addr, "server listening");

    Ok(ServerHandle {
        bound_addr,
        shutdown,
        join,
    })
}

/// Serves until Ctrl+C.
pub async fn run_server(config: &ServerConfig) -> anyhow::Result<()> {
    let handle = start_server(config).await?;
    println!("tessera listening on http://{}", handle.bound_addr());

    tokio::signal::ctrl_c()
        .await
        .context("Ctrl+C handler failed")?;
    info!("shutting down");

    handle.shutdown().await
}
