use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

/// Tail the daemon log written by `daemon --log-file`
pub async fn run(log_path: &Path, lines: usize, follow: bool) -> Result<()> {
    if !log_path.exists() {
        println!("No log file found at {:?}", log_path);
        println!("Start the daemon with --log-file to write one.");
        return Ok(());
    }

    let mut cmd = Command::new("tail");
    if follow {
        cmd.arg("-f");
    }
    cmd.arg("-n").arg(lines.to_string()).arg(log_path);

    let status = cmd.status().context("Failed to run tail")?;
    if !status.success() {
        anyhow::bail!("tail command failed");
    }

    Ok(())
}
