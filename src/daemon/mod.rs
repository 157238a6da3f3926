pub mod server;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::{self, Config};

pub async fn run(config: &Config, socket_path: &Path) -> Result<()> {
    config::ensure_home_dir()?;

    info!(
        "Starting local-notifier daemon on {:?} (namespace {})",
        socket_path, config.namespace
    );

    server::run(socket_path, &config.namespace).await
}
