//! OpenAI Assistants v2 implementation of the generation client.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::AssistantError;

use super::{AssistantClient, ContentBlock, RunId, RunStatus, ThreadId, ThreadMessage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Generation client backed by the OpenAI Assistants v2 API.
pub struct OpenAiAssistant {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiAssistant {
    pub fn new(api_key: SecretString) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default endpoint (proxies, test servers).
    pub fn with_base_url(api_key: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AssistantError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", "assistants=v2")
            .json(body)
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;
        decode(response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AssistantError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AssistantError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssistantError::Api {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| AssistantError::InvalidResponse(e.to_string()))
}

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<serde_json::Value>,
}

/// Map a raw content block to the domain shape.
///
/// A block is text exactly when its `type` is "text" and it carries a
/// `text.value` string; everything else is `Other` tagged with whatever
/// kind the service reported.
fn parse_content_block(raw: &serde_json::Value) -> ContentBlock {
    let kind = raw
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown");
    if kind == "text" {
        if let Some(value) = raw
            .get("text")
            .and_then(|t| t.get("value"))
            .and_then(|v| v.as_str())
        {
            return ContentBlock::Text {
                text: value.to_string(),
            };
        }
    }
    ContentBlock::Other {
        kind: kind.to_string(),
    }
}

#[async_trait::async_trait]
impl AssistantClient for OpenAiAssistant {
    async fn create_thread(&self, prompt: &str) -> Result<ThreadId, AssistantError> {
        let body = serde_json::json!({
            "messages": [{ "role": "user", "content": prompt }]
        });
        let thread: ThreadObject = self.post("/threads", &body).await?;
        debug!(thread_id = %thread.id, "Thread created");
        Ok(ThreadId(thread.id))
    }

    async fn create_run(
        &self,
        thread: &ThreadId,
        assistant_id: &str,
    ) -> Result<RunId, AssistantError> {
        let body = serde_json::json!({ "assistant_id": assistant_id });
        let run: RunObject = self.post(&format!("/threads/{thread}/runs"), &body).await?;
        debug!(thread_id = %thread, run_id = %run.id, "Run started");
        Ok(RunId(run.id))
    }

    async fn run_status(
        &self,
        thread: &ThreadId,
        run: &RunId,
    ) -> Result<RunStatus, AssistantError> {
        let fetched: RunObject = self.get(&format!("/threads/{thread}/runs/{run}")).await?;
        Ok(fetched.status)
    }

    async fn list_messages(&self, thread: &ThreadId) -> Result<Vec<ThreadMessage>, AssistantError> {
        let list: MessageList = self.get(&format!("/threads/{thread}/messages")).await?;
        Ok(list
            .data
            .into_iter()
            .map(|m| ThreadMessage {
                role: m.role,
                content: m.content.iter().map(parse_content_block).collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_block() {
        let raw = serde_json::json!({
            "type": "text",
            "text": { "value": "The correct answer is B.", "annotations": [] }
        });
        assert_eq!(
            parse_content_block(&raw),
            ContentBlock::Text {
                text: "The correct answer is B.".into()
            }
        );
    }

    #[test]
    fn parse_non_text_block_keeps_kind() {
        let raw = serde_json::json!({ "type": "refusal", "refusal": "cannot answer" });
        assert_eq!(
            parse_content_block(&raw),
            ContentBlock::Other {
                kind: "refusal".into()
            }
        );
    }

    #[test]
    fn parse_text_block_without_value_is_other() {
        // A "text" block missing its value is not usable as text.
        let raw = serde_json::json!({ "type": "text" });
        assert_eq!(
            parse_content_block(&raw),
            ContentBlock::Other {
                kind: "text".into()
            }
        );
    }
}
