//! The HTTP API.
//!
//! Routes:
//! - `GET /transactions?month&year&search`
//! - `POST /transactions`
//! - `PUT /transactions/{id}`
//! - `DELETE /transactions/{id}`
//! - `GET /summary?month&year&search`
//! - `GET /export?month&year&search`
//! - `GET /preferences`, `PUT /preferences`
//!
//! Errors are returned as `{"error": "<message>"}`.

mod error;
mod handlers;

pub use error::ApiError;

use crate::config::Preferences;
use crate::store::Store;
use crate::{Config, Result};
use anyhow::Context;
use axum::extract::{MatchedPath, Request};
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// The state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    preferences: Arc<RwLock<Preferences>>,
    /// When present, preference changes are written to `config.json`.
    config: Option<Arc<RwLock<Config>>>,
}

impl AppState {
    /// State backed by `store`, with default preferences that live only as long as the server.
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
            preferences: Arc::new(RwLock::new(Preferences::default())),
            config: None,
        }
    }

    /// State backed by the data file and preferences of `config`.
    pub fn from_config(config: Config) -> Self {
        Self {
            store: Arc::new(config.store()),
            preferences: Arc::new(RwLock::new(config.preferences().clone())),
            config: Some(Arc::new(RwLock::new(config))),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn preferences(&self) -> Preferences {
        self.preferences.read().await.clone()
    }

    /// Replaces the preferences, saving them first if there is a config file.
    pub async fn set_preferences(&self, preferences: Preferences) -> Result<()> {
        if let Some(config) = &self.config {
            config
                .write()
                .await
                .set_preferences(preferences.clone())
                .await?;
        }
        *self.preferences.write().await = preferences;
        Ok(())
    }
}

/// Builds the router with request tracing and permissive CORS, so that a front end served from
/// another origin can call it.
pub fn router(state: AppState) -> Router {
    let tracing_layer = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        let method = req.method();
        let uri = req.uri();

        let matched_path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str());

        tracing::debug_span!("request", %method, %uri, matched_path)
    });

    Router::new()
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/{id}",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        .route("/summary", get(handlers::summary))
        .route("/export", get(handlers::export))
        .route(
            "/preferences",
            get(handlers::get_preferences).put(handlers::put_preferences),
        )
        .with_state(state)
        .layer(tracing_layer)
        .layer(CorsLayer::permissive())
}

/// Serves the API on `listener` until Ctrl+C or SIGTERM is received.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server stopped unexpectedly")
}

/// Waits for either the ctrl+c or terminate signal, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("Unable to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => debug!("Received ctrl+c signal."),
        _ = terminate => debug!("Received terminate signal."),
    }
}
