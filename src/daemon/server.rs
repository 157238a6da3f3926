use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::bridge::{Bridge, BridgeHandle, Outbound};
use crate::channel::{Frame, RequestFrame, ResponseFrame};
use crate::notify::{self, NotificationService};

pub async fn run(socket_path: &Path, namespace: &str) -> Result<()> {
    // Remove existing socket if present
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    } else if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(socket_path)?;
    info!("Listening on {:?}", socket_path);

    serve(listener, notify::platform_service(), namespace).await
}

/// Accept connections forever, sharing one bridge between them
pub async fn serve(
    listener: UnixListener,
    service: Arc<dyn NotificationService>,
    namespace: &str,
) -> Result<()> {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let bridge = Bridge::spawn(service, namespace, outbound_tx);

    let (registrations_tx, registrations_rx) = mpsc::unbounded_channel();
    tokio::spawn(route(outbound_rx, registrations_rx));

    let mut next_connection: u64 = 1;
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let connection = next_connection;
                next_connection += 1;
                debug!("Accepted connection {}", connection);

                let bridge = bridge.clone();
                let registrations = registrations_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(connection, stream, bridge, registrations).await {
                        error!("Error handling connection {}: {}", connection, e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

enum Registration {
    Open(u64, mpsc::UnboundedSender<Frame>),
    Closed(u64),
}

/// Send each response to the connection that made the call and every event to all
async fn route(
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    mut registrations: mpsc::UnboundedReceiver<Registration>,
) {
    let mut connections: HashMap<u64, mpsc::UnboundedSender<Frame>> = HashMap::new();

    loop {
        tokio::select! {
            // A connection registers before its first call, so drain registrations first.
            biased;

            Some(registration) = registrations.recv() => match registration {
                Registration::Open(connection, frames) => {
                    connections.insert(connection, frames);
                }
                Registration::Closed(connection) => {
                    connections.remove(&connection);
                    debug!("Connection {} closed", connection);
                }
            },

            item = outbound.recv() => match item {
                Some(Outbound::Response { origin, id, result }) => match connections.get(&origin) {
                    Some(frames) => {
                        let _ = frames.send(Frame::Response(ResponseFrame::new(id, result)));
                    }
                    None => debug!("Dropping response {} for closed connection {}", id, origin),
                },
                Some(Outbound::Event(event)) => {
                    let frame = Frame::Event(event.to_call());
                    for frames in connections.values() {
                        let _ = frames.send(frame.clone());
                    }
                }
                None => break,
            },
        }
    }
}

async fn handle_connection(
    connection: u64,
    stream: UnixStream,
    bridge: BridgeHandle,
    registrations: mpsc::UnboundedSender<Registration>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();

    let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<Frame>();
    registrations
        .send(Registration::Open(connection, frames_tx))
        .map_err(|_| anyhow!("Router stopped"))?;

    tokio::spawn(async move {
        while let Some(frame) = frames_rx.recv().await {
            let line = match frame.encode() {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to encode frame: {}", e);
                    continue;
                }
            };
            if let Err(e) = write_half.write_all(line.as_bytes()).await {
                debug!("Connection {} stopped accepting frames: {}", connection, e);
                break;
            }
        }
    });

    let result = read_requests(connection, read_half, &bridge).await;
    let _ = registrations.send(Registration::Closed(connection));
    result
}

async fn read_requests(connection: u64, read_half: OwnedReadHalf, bridge: &BridgeHandle) -> Result<()> {
    let reader = BufReader::new(read_half);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RequestFrame>(&line) {
            Ok(request) => {
                info!("Received {} call ({}) on connection {}", request.call.method, request.id, connection);
                bridge.call(connection, request.id, request.call)?;
            }
            Err(e) => {
                error!("Failed to parse request: {}", e);
            }
        }
    }

    Ok(())
}
