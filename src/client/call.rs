use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::channel::{Frame, MethodCall, MethodResult, RequestFrame, ResponseFrame};

const REQUEST_ID: u64 = 1;

/// Arguments of a `notify` call as built from the command line
#[derive(Debug, Clone, Default)]
pub struct NotifyArgs {
    pub identifier: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub silent: bool,
    pub actions: Vec<String>,
}

impl NotifyArgs {
    pub fn to_arguments(&self) -> Value {
        let mut args = Map::new();
        args.insert("identifier".into(), json!(self.identifier));
        for (key, value) in [
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("body", &self.body),
        ] {
            if let Some(value) = value {
                args.insert(key.into(), json!(value));
            }
        }
        if self.silent {
            args.insert("silent".into(), json!(true));
        }
        if !self.actions.is_empty() {
            let actions = self.actions.iter().map(|text| json!({ "text": text })).collect();
            args.insert("actions".into(), Value::Array(actions));
        }
        Value::Object(args)
    }
}

/// Issue one call and wait for its response, skipping any events
pub async fn call(socket_path: &Path, method: &str, arguments: Value) -> Result<MethodResult> {
    let stream = super::connect(socket_path).await?;
    let (read_half, mut write_half) = stream.into_split();

    let request = RequestFrame {
        id: REQUEST_ID,
        call: MethodCall::new(method, arguments),
    };
    let mut json = serde_json::to_string(&request)?;
    json.push('\n');

    write_half.write_all(json.as_bytes()).await?;
    write_half.flush().await?;

    let mut lines = BufReader::new(read_half).lines();
    while let Some(line) = lines.next_line().await? {
        match Frame::decode(&line) {
            Ok(Frame::Response(response)) if response.id == REQUEST_ID => {
                return Ok(response.into_result());
            }
            Ok(Frame::Response(response)) => debug!("Ignoring response {}", response.id),
            Ok(Frame::Event(event)) => debug!("Ignoring event {}", event.method),
            Err(e) => warn!("Failed to parse frame from daemon: {}", e),
        }
    }

    bail!("Daemon closed the connection before answering {}", method)
}

/// Print a successful result, or fail with the reported error
pub fn report(method: &str, result: MethodResult) -> Result<()> {
    match result {
        MethodResult::Success(value) => {
            println!("{}", value);
            Ok(())
        }
        MethodResult::Error(error) => bail!(
            "{} failed ({}): {}",
            method,
            error.code,
            error.message.unwrap_or_default()
        ),
        MethodResult::NotImplemented => bail!("{} is not implemented by the daemon", method),
    }
}

pub async fn notify(socket_path: &Path, args: &NotifyArgs) -> Result<()> {
    let result = call(socket_path, "notify", args.to_arguments()).await?;
    report("notify", result)
}

pub async fn close(socket_path: &Path, identifier: &str) -> Result<()> {
    let result = call(socket_path, "close", json!({ "identifier": identifier })).await?;
    report("close", result)
}

/// Send an arbitrary call and print the raw response frame
pub async fn raw(socket_path: &Path, method: &str, arguments: Option<String>) -> Result<()> {
    let arguments = match arguments {
        Some(json) => serde_json::from_str(&json).context("Failed to parse --args as JSON")?,
        None => Value::Null,
    };
    let result = call(socket_path, method, arguments).await?;
    println!("{}", serde_json::to_string(&ResponseFrame::new(REQUEST_ID, result))?);
    Ok(())
}
