// Embed Info.plist into binary for macOS bundle identity
// This allows UNUserNotificationCenter to work properly
#[cfg(target_os = "macos")]
embed_plist::embed_info_plist!("../Info.plist");

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use local_notifier::client::{self, call::NotifyArgs};
use local_notifier::config::{self, Config};
use local_notifier::daemon;

#[derive(Parser)]
#[command(name = "local-notifier")]
#[command(about = "Bridge between a method-call channel and native OS notifications")]
#[command(version)]
struct Cli {
    /// Daemon socket (defaults to the configured one)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notification bridge daemon
    Daemon {
        /// Append logs to the daemon log file instead of stderr
        #[arg(long)]
        log_file: bool,
    },

    /// Show a notification
    Notify {
        /// Unique notification identifier
        identifier: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        subtitle: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        /// Do not play a sound
        #[arg(long)]
        silent: bool,

        /// Add an action button (repeatable, in order)
        #[arg(short = 'a', long = "action")]
        actions: Vec<String>,
    },

    /// Close a notification
    Close {
        identifier: String,
    },

    /// Send a raw method call and print the response
    Call {
        method: String,

        /// Arguments as a JSON value
        #[arg(long)]
        args: Option<String>,
    },

    /// Print notification events as they arrive
    Listen {
        /// Print raw JSON frames
        #[arg(long)]
        json: bool,
    },

    /// Check daemon status
    Status,

    /// Tail daemon logs
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match log_file {
        Some(path) => {
            config::ensure_home_dir()?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = match cli.command {
        Commands::Daemon { log_file: true } => Some(config::log_path()),
        _ => None,
    };
    init_tracing(log_file.as_deref())?;

    let config = Config::load()?;
    let socket = cli.socket.unwrap_or_else(|| config.socket_path());

    match cli.command {
        Commands::Daemon { .. } => {
            daemon::run(&config, &socket).await?;
        }
        Commands::Notify { identifier, title, subtitle, body, silent, actions } => {
            let args = NotifyArgs { identifier, title, subtitle, body, silent, actions };
            client::call::notify(&socket, &args).await?;
        }
        Commands::Close { identifier } => {
            client::call::close(&socket, &identifier).await?;
        }
        Commands::Call { method, args } => {
            client::call::raw(&socket, &method, args).await?;
        }
        Commands::Listen { json } => {
            client::listen::run(&socket, json).await?;
        }
        Commands::Status => {
            client::status::run(&socket).await?;
        }
        Commands::Logs { lines, follow } => {
            client::logs::run(&config::log_path(), lines, follow).await?;
        }
    }

    Ok(())
}
