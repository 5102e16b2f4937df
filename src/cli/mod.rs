//! CLI entry point for parley.

pub mod chat;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "parley=info,tower_http=info";

/// Chat relay between a web UI and a hosted agent service.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about = "Chat relay for a hosted agent service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP relay
    Serve(ServeArgs),
    /// Talk to a running relay
    Chat(ChatArgs),
    /// Ask the chat-completions deployment directly
    Complete(CompleteArgs),
}

/// Arguments for `parley serve`. Flags override config and environment.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for `parley chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Relay endpoint
    #[arg(long, default_value = crate::client::DEFAULT_URL)]
    pub url: String,

    /// Send one message and exit; without it, read lines from stdin
    pub prompt: Option<String>,
}

/// Arguments for `parley complete`.
#[derive(Parser, Debug)]
pub struct CompleteArgs {
    /// Print the reply as it streams in
    #[arg(long)]
    pub stream: bool,

    /// User prompt
    pub prompt: String,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Install the fmt subscriber on stderr. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
