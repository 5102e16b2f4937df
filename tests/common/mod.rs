//! Shared test helpers and a scripted gateway.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{json, Value};

use parley::error::{GatewayError, ServiceError};
use parley::gateway::AgentGateway;
use parley::relay::{PollPolicy, TurnRelay};
use parley::types::{Agent, ListOrder, Role, Run, RunOptions, RunStatus, ThreadMessage};

pub const AGENT_ID: &str = "asst_test";
pub const NEW_THREAD_ID: &str = "thread_new";
pub const RUN_ID: &str = "run_1";

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetAgent(String),
    CreateThread,
    PostMessage {
        thread_id: String,
        role: Role,
        text: String,
    },
    StartRun {
        thread_id: String,
        agent_id: String,
        options: RunOptions,
    },
    PollRun {
        thread_id: String,
        run_id: String,
    },
    ListMessages(String),
}

/// Gateway stage to fail at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailAt {
    AgentLookup,
    ThreadCreation,
    UserMessage,
    AssistantMessage,
    RunStart,
    RunPoll,
    MessageRetrieval,
}

/// Gateway returning scripted results and recording every call.
pub struct MockGateway {
    calls: Mutex<Vec<Call>>,
    initial_status: RunStatus,
    polls: Mutex<VecDeque<Run>>,
    /// Returned once the scripted polls run out.
    settled: Run,
    messages: Vec<ThreadMessage>,
    fail_at: Option<FailAt>,
}

impl MockGateway {
    /// A run that starts queued and completes on the first poll.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            initial_status: RunStatus::Queued,
            polls: Mutex::new(VecDeque::new()),
            settled: run(RunStatus::Completed),
            messages: Vec::new(),
            fail_at: None,
        }
    }

    pub fn with_initial_status(mut self, status: RunStatus) -> Self {
        self.initial_status = status;
        self
    }

    /// Statuses returned by successive polls before the settled run.
    pub fn with_polls(self, statuses: &[RunStatus]) -> Self {
        self.polls
            .lock()
            .unwrap()
            .extend(statuses.iter().cloned().map(run));
        self
    }

    /// Status returned by every poll after the scripted ones.
    pub fn settling_as(mut self, settled: Run) -> Self {
        self.settled = settled;
        self
    }

    /// Never leave `in_progress`.
    pub fn pending_forever(self) -> Self {
        self.settling_as(run(RunStatus::InProgress))
    }

    pub fn with_messages(mut self, messages: Vec<ThreadMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::PollRun { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fails(&self, stage: FailAt) -> Option<ServiceError> {
        (self.fail_at == Some(stage)).then(|| ServiceError::Status {
            status: 500,
            message: "boom".into(),
            body: None,
        })
    }
}

#[async_trait]
impl AgentGateway for MockGateway {
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, GatewayError> {
        self.record(Call::GetAgent(agent_id.to_string()));
        if let Some(e) = self.fails(FailAt::AgentLookup) {
            return Err(GatewayError::AgentLookup(e));
        }
        Ok(Agent {
            id: agent_id.to_string(),
            name: Some("Test agent".into()),
            model: None,
            instructions: None,
        })
    }

    async fn create_thread(&self) -> Result<String, GatewayError> {
        self.record(Call::CreateThread);
        if let Some(e) = self.fails(FailAt::ThreadCreation) {
            return Err(GatewayError::ThreadCreation(e));
        }
        Ok(NEW_THREAD_ID.to_string())
    }

    async fn post_message(
        &self,
        thread_id: &str,
        role: Role,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.record(Call::PostMessage {
            thread_id: thread_id.to_string(),
            role,
            text: text.to_string(),
        });
        let stage = match role {
            Role::User => FailAt::UserMessage,
            Role::Assistant => FailAt::AssistantMessage,
        };
        if let Some(source) = self.fails(stage) {
            return Err(GatewayError::MessageSubmission { role, source });
        }
        Ok(())
    }

    async fn start_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        options: &RunOptions,
    ) -> Result<Run, GatewayError> {
        self.record(Call::StartRun {
            thread_id: thread_id.to_string(),
            agent_id: agent_id.to_string(),
            options: options.clone(),
        });
        if let Some(e) = self.fails(FailAt::RunStart) {
            return Err(GatewayError::RunStart(e));
        }
        Ok(run(self.initial_status.clone()))
    }

    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        self.record(Call::PollRun {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
        });
        if let Some(e) = self.fails(FailAt::RunPoll) {
            return Err(GatewayError::RunPoll(e));
        }
        let next = self.polls.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.settled.clone()))
    }

    fn list_messages(
        &self,
        thread_id: &str,
        _order: ListOrder,
    ) -> BoxStream<'static, Result<ThreadMessage, GatewayError>> {
        self.record(Call::ListMessages(thread_id.to_string()));
        if let Some(e) = self.fails(FailAt::MessageRetrieval) {
            return Box::pin(futures::stream::iter(vec![Err(
                GatewayError::MessageRetrieval(e),
            )]));
        }
        Box::pin(futures::stream::iter(
            self.messages.clone().into_iter().map(Ok).collect::<Vec<_>>(),
        ))
    }
}

pub fn run(status: RunStatus) -> Run {
    Run {
        id: RUN_ID.to_string(),
        thread_id: None,
        status,
        last_error: None,
        incomplete_details: None,
    }
}

/// Raw text block as the agent service returns it.
pub fn text_block(text: &str) -> Value {
    json!({ "type": "text", "text": { "value": text, "annotations": [] } })
}

pub fn thread_message(id: &str, role: Role, blocks: Vec<Value>) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        role,
        content: blocks,
        created_at: Some(1_700_000_000),
    }
}

/// Short poll interval with a small attempt bound.
pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_attempts: Some(max_attempts),
        timeout: None,
    }
}

/// Relay over `gateway` with the test agent id and a fast poll policy.
pub fn relay_with(gateway: Arc<MockGateway>) -> TurnRelay {
    TurnRelay::builder()
        .gateway(gateway as Arc<dyn AgentGateway>)
        .agent_id(AGENT_ID)
        .poll(fast_policy(5))
        .build()
}
