//! Agent gateway trait and implementations.
//!
//! A gateway wraps the external agent service: agents, threads, messages and
//! runs. Every method returns a stage-tagged [`GatewayError`] so callers can
//! tell which step failed without inspecting transport errors.

pub mod azure;
pub mod http;

pub use azure::AzureAgentsGateway;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::GatewayError;
use crate::types::{Agent, ListOrder, Role, Run, RunOptions, ThreadMessage};

/// Core trait implemented by agent service clients.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Look up an agent by id.
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, GatewayError>;

    /// Create an empty thread and return its id.
    async fn create_thread(&self) -> Result<String, GatewayError>;

    /// Reuse `thread_id` when given, otherwise create a new thread.
    async fn ensure_thread(&self, thread_id: Option<&str>) -> Result<String, GatewayError> {
        match thread_id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(id.to_string()),
            None => self.create_thread().await,
        }
    }

    /// Append one text message to a thread.
    async fn post_message(&self, thread_id: &str, role: Role, text: &str)
        -> Result<(), GatewayError>;

    /// Start a run of `agent_id` over the thread.
    async fn start_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        options: &RunOptions,
    ) -> Result<Run, GatewayError>;

    /// Fetch the current state of a run once.
    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError>;

    /// Stream all messages of a thread, following pagination.
    fn list_messages(
        &self,
        thread_id: &str,
        order: ListOrder,
    ) -> BoxStream<'static, Result<ThreadMessage, GatewayError>>;
}
