//! Application wiring: shared state, router and server loop.

use std::sync::Arc;

use assetmgr_api::{Client, ClientConfig};
use assetmgr_upload::UploadSettings;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::routes;

/// State shared by every handler. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    settings: UploadSettings,
    client_config: ClientConfig,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings: config.upload_settings(),
                client_config: config.client_config(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.inner.settings
    }

    /// API client authenticated with `api_key`.
    pub fn client(&self, api_key: &str) -> Result<Client, assetmgr_api::Error> {
        Client::with_config(api_key, self.inner.client_config.clone())
    }
}

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/asset-manager/get_output_images",
            get(routes::get_output_images),
        )
        .route("/asset-manager/upload_assets", post(routes::upload_assets))
        .route("/asset-manager/delete_image", post(routes::delete_image))
        .route(
            "/asset-manager/get_organizations",
            get(routes::get_organizations),
        )
        .route("/asset-manager/get_projects", get(routes::get_projects))
        .route(
            "/asset-manager/test_connection",
            get(routes::test_connection),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until Ctrl+C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    let app = router(AppState::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
