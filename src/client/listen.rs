use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::channel::Frame;

/// Print every event the daemon broadcasts until it disconnects
pub async fn run(socket_path: &Path, json: bool) -> Result<()> {
    let stream = super::connect(socket_path).await?;
    info!("Listening for notification events on {:?}", socket_path);

    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines.next_line().await? {
        match Frame::decode(&line) {
            Ok(Frame::Event(_)) if json => println!("{}", line),
            Ok(Frame::Event(event)) => println!("{} {}", event.method, event.arguments),
            Ok(Frame::Response(_)) => {}
            Err(e) => warn!("Failed to parse frame from daemon: {}", e),
        }
    }

    println!("Daemon closed the connection");
    Ok(())
}
