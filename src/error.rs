//! Error types for Quiz Assist, one enum per domain. Task-level and
//! per-item faults are kept apart on purpose: a `PipelineError` fails the
//! whole task, an `ItemError` is recorded against one item and the task
//! moves on.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Generation-service errors. A call either fails outright (network, auth,
/// malformed payload) or is timed out by the caller — the timeout is not a
/// variant here because the executor treats it as a retryable gap, not an
/// error (see `GenerationPipeline::call_with_timeout`).
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Assistant request failed: {0}")]
    Request(String),

    #[error("Assistant returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid assistant response: {0}")]
    InvalidResponse(String),
}

/// Fatal task-level errors: anything escaping the resolution or enumeration
/// phase fails the whole task with this error's message as the task error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Cooperative cancellation observed at a checkpoint. Not a failure —
    /// the task wrapper maps this to status `cancelled`.
    #[error("Cancelled by user")]
    Cancelled,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("No topics found")]
    NoTopics,

    #[error("No questions found")]
    NoQuestions,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Per-item errors. Every variant except `Cancelled` is recorded as a
/// failure entry on the item and never aborts the task.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Cancellation observed inside the item (poll loop). Propagates up to
    /// cancel the whole task.
    #[error("Cancelled by user")]
    Cancelled,

    #[error("No options found")]
    NoOptions,

    #[error("Failed to create thread")]
    ThreadCreation,

    #[error("Failed to start run")]
    RunCreation,

    #[error("Timeout waiting for assistant response")]
    PollTimeout,

    #[error("No assistant message returned")]
    NoMessage,

    #[error("Database update failed")]
    PersistFailed,

    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),
}
