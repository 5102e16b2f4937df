//! REST client for Azure AI Agents style services.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::{self, CredentialProvider};
use crate::config::AgentSettings;
use crate::error::{GatewayError, RelayError, ServiceError};
use crate::types::{Agent, ContentBlock, ListOrder, Role, Run, RunOptions, ThreadMessage};

use super::http::{build_client, read_json, CLIENT_REQUEST_ID};
use super::AgentGateway;

/// Agent service gateway speaking the assistants/threads/runs REST API.
#[derive(Clone)]
pub struct AzureAgentsGateway {
    client: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn CredentialProvider>,
}

#[derive(Debug, Deserialize)]
struct ThreadRecord {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

impl AzureAgentsGateway {
    /// `endpoint`: project endpoint, e.g.
    /// "https://myresource.services.ai.azure.com/api/projects/myproject"
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        credential: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            credential,
        }
    }

    /// Build a gateway from settings; `None` when no endpoint is configured.
    pub fn from_settings(settings: &AgentSettings) -> Result<Option<Self>, RelayError> {
        let Some(ref endpoint) = settings.endpoint else {
            return Ok(None);
        };
        let client = build_client(settings.request_timeout)?;
        Ok(Some(Self::new(
            client,
            endpoint.clone(),
            settings.api_version.clone(),
            auth::provider_from_settings(settings),
        )))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let credential = self.credential.credential().await?;
        let request = credential
            .apply(request)
            .query(&[("api-version", self.api_version.as_str())])
            .header(CLIENT_REQUEST_ID, uuid::Uuid::new_v4().to_string());
        let resp = request.send().await?;
        read_json(resp).await
    }

    async fn fetch_message_page(
        &self,
        thread_id: &str,
        order: ListOrder,
        after: Option<&str>,
    ) -> Result<MessagePage, ServiceError> {
        let mut query = vec![("order", order.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        let request = self
            .client
            .get(self.url(&format!("threads/{thread_id}/messages")))
            .query(&query);
        self.send(request).await
    }
}

#[async_trait]
impl AgentGateway for AzureAgentsGateway {
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, GatewayError> {
        debug!(agent_id, "Agent service get_agent");
        let request = self.client.get(self.url(&format!("assistants/{agent_id}")));
        self.send(request).await.map_err(GatewayError::AgentLookup)
    }

    async fn create_thread(&self) -> Result<String, GatewayError> {
        debug!("Agent service create_thread");
        let request = self
            .client
            .post(self.url("threads"))
            .json(&serde_json::json!({}));
        let thread: ThreadRecord = self.send(request).await.map_err(GatewayError::ThreadCreation)?;
        if thread.id.is_empty() {
            return Err(GatewayError::ThreadCreation(ServiceError::Protocol(
                "thread id is empty".into(),
            )));
        }
        Ok(thread.id)
    }

    async fn post_message(
        &self,
        thread_id: &str,
        role: Role,
        text: &str,
    ) -> Result<(), GatewayError> {
        debug!(thread_id, %role, "Agent service post_message");
        let body = serde_json::json!({
            "role": role,
            "content": [ContentBlock::text(text)],
        });
        let request = self
            .client
            .post(self.url(&format!("threads/{thread_id}/messages")))
            .json(&body);
        self.send::<serde_json::Value>(request)
            .await
            .map(|_| ())
            .map_err(|source| GatewayError::MessageSubmission { role, source })
    }

    async fn start_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        options: &RunOptions,
    ) -> Result<Run, GatewayError> {
        debug!(thread_id, agent_id, "Agent service start_run");
        let mut body = serde_json::json!({ "assistant_id": agent_id });
        if let Some(obj) = body.as_object_mut() {
            if let Some(temperature) = options.temperature {
                obj.insert("temperature".into(), temperature.into());
            }
            if let Some(max) = options.max_completion_tokens {
                obj.insert("max_completion_tokens".into(), max.into());
            }
        }
        let request = self
            .client
            .post(self.url(&format!("threads/{thread_id}/runs")))
            .json(&body);
        self.send(request).await.map_err(GatewayError::RunStart)
    }

    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<Run, GatewayError> {
        debug!(thread_id, run_id, "Agent service poll_run");
        let request = self
            .client
            .get(self.url(&format!("threads/{thread_id}/runs/{run_id}")));
        self.send(request).await.map_err(GatewayError::RunPoll)
    }

    fn list_messages(
        &self,
        thread_id: &str,
        order: ListOrder,
    ) -> BoxStream<'static, Result<ThreadMessage, GatewayError>> {
        debug!(thread_id, %order, "Agent service list_messages");
        let gateway = self.clone();
        let thread_id = thread_id.to_string();

        let stream = async_stream::stream! {
            let mut after: Option<String> = None;
            loop {
                let page = match gateway
                    .fetch_message_page(&thread_id, order, after.as_deref())
                    .await
                {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(GatewayError::MessageRetrieval(e));
                        break;
                    }
                };

                let has_more = page.has_more;
                let next = page
                    .last_id
                    .clone()
                    .or_else(|| page.data.last().map(|m| m.id.clone()));
                for message in page.data {
                    yield Ok(message);
                }

                match next {
                    Some(id) if has_more && after.as_deref() != Some(id.as_str()) => {
                        after = Some(id);
                    }
                    _ => break,
                }
            }
        };

        Box::pin(stream)
    }
}
