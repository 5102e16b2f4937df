//! Convenience re-exports for common use.

pub use crate::client::RelayClient;
pub use crate::config::RelayConfig;
pub use crate::error::{RelayError, Result};
pub use crate::gateway::{AgentGateway, AzureAgentsGateway};
pub use crate::relay::{PollPolicy, TurnRelay};
pub use crate::types::{ChatMessage, ChatRequest, ChatResponse, Role, RunStatus};
