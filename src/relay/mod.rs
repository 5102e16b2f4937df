//! Turn relay: one user/assistant exchange against the agent service.
//!
//! A turn validates the caller's request, forwards the latest user and
//! assistant messages to a thread, runs the agent, waits for the run to
//! settle and returns the thread's messages as plain text.

pub mod poll;

pub use poll::{wait_for_run, PollPolicy};

use std::sync::Arc;

use bon::Builder;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{RelayConfig, TurnDefaults};
use crate::error::{GatewayError, RelayError, Result};
use crate::gateway::{AgentGateway, AzureAgentsGateway};
use crate::normalize;
use crate::types::{
    latest_with_role, ChatMessage, ChatRequest, ChatResponse, ListOrder, Role, RunOptions,
    RunStatus,
};

const MISSING_CONFIG: &str = "PROJECT_ENDPOINT or AGENT_ID not set";
const MISSING_MESSAGES: &str = "Messages are required";

/// Drives chat turns through an [`AgentGateway`].
///
/// A relay without a gateway or agent id still serves requests; every turn
/// then fails with a configuration error before touching the network.
#[derive(Clone, Builder)]
pub struct TurnRelay {
    gateway: Option<Arc<dyn AgentGateway>>,
    #[builder(into)]
    agent_id: Option<String>,
    #[builder(default)]
    poll: PollPolicy,
    #[builder(default)]
    defaults: TurnDefaults,
}

impl TurnRelay {
    /// Build a relay backed by the REST gateway described in `config`.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let gateway = AzureAgentsGateway::from_settings(&config.agent)?
            .map(|g| Arc::new(g) as Arc<dyn AgentGateway>);
        if gateway.is_none() || config.agent.agent_id.is_none() {
            warn!("{MISSING_CONFIG}; chat requests will fail until configured");
        }
        Ok(Self {
            gateway,
            agent_id: config.agent.agent_id.clone(),
            poll: config.poll.clone(),
            defaults: config.defaults,
        })
    }

    /// Whether turns can reach the agent service at all.
    pub fn is_configured(&self) -> bool {
        self.gateway.is_some() && self.agent_id.is_some()
    }

    /// Run one exchange to completion.
    pub async fn relay_turn(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        if request.messages.is_empty() {
            return Err(RelayError::validation(MISSING_MESSAGES));
        }

        let (gateway, agent_id) = match (&self.gateway, &self.agent_id) {
            (Some(gateway), Some(agent_id)) => (gateway.as_ref(), agent_id.as_str()),
            _ => {
                error!("{MISSING_CONFIG}");
                return Err(RelayError::configuration(MISSING_CONFIG));
            }
        };

        // `maxTokens` from the caller is not a run limit; only the operator may cap runs.
        let options = RunOptions {
            temperature: Some(request.temperature.unwrap_or(self.defaults.temperature)),
            max_completion_tokens: self.defaults.max_tokens,
        };

        let agent = logged(gateway.get_agent(agent_id).await)?;
        let thread_id = logged(gateway.ensure_thread(request.thread_id.as_deref()).await)?;

        // Only the latest message of each role is forwarded, never full history.
        for role in [Role::User, Role::Assistant] {
            if let Some(message) = latest_with_role(&request.messages, role) {
                logged(gateway.post_message(&thread_id, role, &message.content).await)?;
            }
        }

        let run = logged(gateway.start_run(&thread_id, &agent.id, &options).await)?;
        let run = wait_for_run(gateway, &thread_id, run, &self.poll, cancel).await?;

        match run.status {
            RunStatus::Completed => {}
            RunStatus::Failed => {
                error!(run_id = %run.id, detail = ?run.last_error, "Agent run failed");
                return Err(RelayError::RunExecution {
                    run_id: run.id,
                    detail: run.last_error,
                });
            }
            RunStatus::Incomplete => {
                error!(run_id = %run.id, detail = ?run.incomplete_details, "Agent run incomplete");
                return Err(RelayError::RunExecution {
                    run_id: run.id,
                    detail: run.incomplete_details,
                });
            }
            ref other => {
                warn!(run_id = %run.id, status = %other, "Run settled without completing");
            }
        }

        let mut records = gateway.list_messages(&thread_id, ListOrder::Asc);
        let mut messages = Vec::new();
        while let Some(record) = records.next().await {
            let record = logged(record)?;
            messages.extend(
                record
                    .content
                    .iter()
                    .filter_map(normalize::block_text)
                    .map(|content| ChatMessage {
                        role: record.role,
                        content,
                    }),
            );
        }

        info!(%thread_id, run_id = %run.id, messages = messages.len(), "Turn relayed");
        Ok(ChatResponse {
            thread_id,
            messages,
        })
    }
}

fn logged<T>(result: std::result::Result<T, GatewayError>) -> Result<T> {
    result.map_err(|e| {
        error!(stage = e.stage(), error = %e, "{}", e.public_message());
        RelayError::Gateway(e)
    })
}
