//! # imgsink: image upload endpoint backed by object storage
//!
//! `imgsink` serves a single HTTP endpoint that accepts an image in the body of a `POST` request
//! and writes it, byte for byte, as an object in a configured bucket. The object key is taken from
//! the request's `Content-Disposition` filename.
//!
//! ## Request Flow
//!
//! | Method | Outcome |
//! |---|---|
//! | `GET` | 200, liveness check, no side effects |
//! | `POST` | validate headers, then one object store write |
//! | anything else | 405 |
//!
//! A `POST` is checked in order, stopping at the first failure:
//!
//! 1. `Content-Type` must start with `image/`, otherwise 415
//! 2. `Content-Disposition` must be present, otherwise 400
//! 3. `Content-Disposition` must be `attachment; filename="<name>"` with a non-empty name,
//!    otherwise 400
//! 4. the body must fit in `max_upload_size`, otherwise 413
//!
//! The body is then written to `bucket_name/<name>`. A successful write answers 200, any store
//! failure answers 500. Responses never carry a body.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Storage sits behind the
//! [`storage::ObjectStore`] trait; the store is built once at startup and shared by all requests.
//! Configuration ([`config`]) is loaded once and injected through [`AppState`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use imgsink::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = imgsink::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     imgsink::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)
//!         .await?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
pub mod api;
pub mod config;
pub mod errors;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use axum::{Router, extract::DefaultBodyLimit, routing::any};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use storage::ObjectStore;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};

/// Application state shared across all request handlers.
///
/// - `config`: configuration loaded at startup, read-only afterwards
/// - `store`: the object store handle, constructed once and shared by every request
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ObjectStore>,
}

/// Build the application router: the upload endpoint, its body limit and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_size;

    Router::new()
        .route("/", any(api::handlers::upload::handle_request))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] builds the object store client and the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with the configured object store
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting imgsink with configuration: {:#?}", config);

        let store = storage::create_store(&config.storage).await;
        Ok(Self::with_store(config, store))
    }

    /// Create an application around an existing store
    pub fn with_store(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        let state = AppState::builder().config(config.clone()).store(store).build();
        let router = build_router(state);

        Self { router, config }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "imgsink listening on http://{}, writing to bucket {}",
            bind_addr, self.config.bucket_name
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
