#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the income vs crime dashboard.
//!
//! The dataset is loaded once at startup into a [`DatasetCache`] shared
//! between workers; requests read the cached, immutable dataset. Each
//! request builds its own filter state from the query string and recomputes
//! the requested page, so requests never share mutable state.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use income_crime_dataset::progress::null_progress;
use income_crime_dataset::{DatasetCache, DatasetConfig, DatasetError};
use income_crime_dataset_models::Dataset;
use thiserror::Error;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Binding or serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// The process-wide dataset cache, primed before the server starts.
    pub cache: Arc<DatasetCache>,
}

impl AppState {
    /// The cached dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the cache was never primed and loading
    /// now fails.
    pub fn dataset(&self) -> Result<Arc<Dataset>, DatasetError> {
        self.cache.get_or_load(&null_progress())
    }
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: String,
    /// Port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, falling back to the defaults. An
    /// unparseable port is ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Replaces the address and port with any values given.
    #[must_use]
    pub fn with_overrides(mut self, bind_addr: Option<String>, port: Option<u16>) -> Self {
        if let Some(bind_addr) = bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

/// Registers the `/api` routes.
///
/// Query strings that fail to deserialize are answered with the same JSON
/// `400` body as rejected filter values.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/filters", web::get().to(handlers::filters))
            .route("/records", web::get().to(handlers::records))
            .route("/key-insights", web::get().to(handlers::key_insights))
            .route("/crime", web::get().to(handlers::crime))
            .route("/income", web::get().to(handlers::income))
            .route("/heatmaps", web::get().to(handlers::heatmaps)),
    );
}

/// Builds the cache for the configured dataset and loads it.
///
/// # Errors
///
/// Returns [`DatasetError`] if the configuration is invalid or the dataset
/// cannot be loaded.
pub fn open_cache() -> Result<Arc<DatasetCache>, DatasetError> {
    let config = DatasetConfig::from_env()?;
    let cache = DatasetCache::new(config.into_source()?);
    log::info!("Loading dataset from {}...", cache.describe());
    cache.get_or_load(&null_progress())?;
    Ok(Arc::new(cache))
}

/// Starts the dashboard API server.
///
/// Loads the dataset first and refuses to start if that fails. This is a
/// regular async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the dataset cannot be loaded, or if the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let cache = open_cache()?;
    run_server_with(cache, config).await
}

/// Serves the dataset held by `cache`.
///
/// The cache is primed before binding, so a source that cannot be loaded
/// stops the server from starting.
///
/// # Errors
///
/// Returns [`ServerError::Dataset`] if the dataset cannot be loaded, or
/// [`ServerError::Io`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server_with(
    cache: Arc<DatasetCache>,
    config: ServerConfig,
) -> Result<(), ServerError> {
    let records = cache.get_or_load(&null_progress())?.len();
    let state = web::Data::new(AppState { cache });
    let ServerConfig { bind_addr, port } = config;

    log::info!("Starting server on {bind_addr}:{port} ({records} records)");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let config = ServerConfig::default().with_overrides(None, Some(9000));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.port, 9000);

        let config = config.with_overrides(Some("0.0.0.0".to_string()), None);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }
}
