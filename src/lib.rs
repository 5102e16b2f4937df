//! parley: chat relay between a web UI and a hosted agent service.
//!
//! Each chat request is forwarded to a server-side thread on the agent
//! service, the agent is run over that thread, and the thread's messages come
//! back as plain text.
//!
//! # Quick Start
//!
//! ```no_run
//! use parley::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> parley::error::Result<()> {
//! let config = RelayConfig::from_env()?;
//! let relay = TurnRelay::from_config(&config)?;
//! let request = ChatRequest::builder()
//!     .messages(vec![ChatMessage::user("Hello!")])
//!     .build();
//! let response = relay.relay_turn(request, &CancellationToken::new()).await?;
//! println!("thread {}", response.thread_id);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod prelude;
pub mod relay;
pub mod types;

#[cfg(feature = "completions")]
pub mod completions;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;
