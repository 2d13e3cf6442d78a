//! gradelens-server — HTTP query surface over gradelens snapshots.
//!
//! Every `GET` handler takes the current snapshot once and answers from it,
//! so a concurrent reload never mixes two datasets in one response.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use gradelens_core::source::CsvSource;

pub use config::{load_config, load_config_from, GradelensConfig};
pub use state::{AppState, SharedState};

/// CORS for the configured browser origins.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid allowed origin: {o}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// The full application: API routes plus CORS.
pub fn router(state: SharedState, allowed_origins: &[String]) -> Result<Router> {
    Ok(routes::api_routes(state).layer(cors_layer(allowed_origins)?))
}

/// Load the dataset named in `config` and serve until ctrl-c.
pub async fn serve(config: GradelensConfig) -> Result<()> {
    let source = Arc::new(CsvSource::new(&config.data_path));
    let state: SharedState = Arc::new(AppState::new(source));

    match state.reload().await {
        Ok(info) => tracing::info!(
            path = %config.data_path.display(),
            students = info.student_count,
            "loaded grades"
        ),
        // Queries answer 503 until a reload succeeds.
        Err(_) => tracing::warn!(
            path = %config.data_path.display(),
            "starting with an empty dataset"
        ),
    }

    let refresher = config
        .refresh_interval()
        .map(|period| state::spawn_periodic_refresh(state.clone(), period));

    let app = router(state, &config.allowed_origins)?;
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("gradelens listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = refresher {
        handle.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
