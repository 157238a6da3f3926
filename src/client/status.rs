use std::path::Path;

use anyhow::Result;
use tokio::net::UnixStream;

pub async fn run(socket_path: &Path) -> Result<()> {
    if !socket_path.exists() {
        println!("Daemon: not running (socket not found)");
        println!("Socket: {:?}", socket_path);
        return Ok(());
    }

    // A stale socket file survives a crashed daemon
    match UnixStream::connect(socket_path).await {
        Ok(_) => {
            println!("Daemon: running");
            println!("Socket: {:?}", socket_path);
        }
        Err(_) => {
            println!("Daemon: not running (socket exists but unresponsive)");
            println!("Socket: {:?}", socket_path);
            println!("Hint: the next `local-notifier daemon` replaces the stale socket");
        }
    }

    Ok(())
}
