//! The `gradelens serve` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(config: Option<PathBuf>, data: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut config = gradelens_server::load_config_from(config.as_deref())?;
    if let Some(data) = data {
        config.data_path = data;
    }
    if let Some(port) = port {
        config.port = port;
    }
    tracing::debug!(?config, "starting server");
    gradelens_server::serve(config).await
}
