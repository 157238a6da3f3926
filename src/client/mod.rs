pub mod call;
pub mod listen;
pub mod logs;
pub mod status;

use std::path::Path;

use anyhow::Result;
use tokio::net::UnixStream;

pub async fn connect(socket_path: &Path) -> Result<UnixStream> {
    UnixStream::connect(socket_path).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to daemon at {:?}: {}. Is the daemon running?",
            socket_path,
            e
        )
    })
}
