//! Generation client — the stateful thread/run/poll protocol used to obtain
//! model-generated explanations.
//!
//! The executor drives this contract: create a thread carrying the prompt,
//! submit a run, poll its status until it completes, then read the first
//! message. Every call is latency-bound; the executor wraps each one in its
//! own short timeout and treats a timed-out call as "no result, try again"
//! rather than an error.

mod openai;

pub use openai::OpenAiAssistant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AssistantError;

/// Opaque identifier of a conversation thread on the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadId(pub String);

/// Opaque identifier of a run within a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(pub String);

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a run. The service progresses through these states; only
/// `Completed` carries a usable answer. Unrecognized wire values map to
/// `Unknown` so a service-side addition never breaks polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

/// One content block of an assistant message.
///
/// The executor only ever consumes plain text; anything else (refusal,
/// image, future block types) is carried as `Other` with its wire kind so
/// the caller can detect a non-text answer by shape instead of matching
/// sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text { text: String },
    Other { kind: String },
}

impl ContentBlock {
    /// The wire kind of this block.
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Other { kind } => kind,
        }
    }
}

/// A message in a thread, newest first as returned by the service.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// Client contract for the external generation service.
///
/// Each call may fail with a fatal [`AssistantError`] (network, auth,
/// malformed payload). Timeouts are the caller's concern.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Create a thread seeded with a single user message.
    async fn create_thread(&self, prompt: &str) -> Result<ThreadId, AssistantError>;

    /// Start a run of the given assistant on a thread.
    async fn create_run(
        &self,
        thread: &ThreadId,
        assistant_id: &str,
    ) -> Result<RunId, AssistantError>;

    /// Fetch the current status of a run.
    async fn run_status(&self, thread: &ThreadId, run: &RunId)
    -> Result<RunStatus, AssistantError>;

    /// List the messages of a thread, newest first.
    async fn list_messages(&self, thread: &ThreadId) -> Result<Vec<ThreadMessage>, AssistantError>;
}
