//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Generation pipeline configuration.
///
/// The durations and counts here define the service's latency and timeout
/// budget and are part of its observable behavior — tasks report a per-item
/// timeout failure exactly when `max_poll_attempts` polls at `poll_interval`
/// pass without the run completing.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Identifier of the assistant that produces explanations.
    pub assistant_id: String,
    /// Timeout applied to each individual call to the generation service.
    /// A timed-out call yields no result and is retried within the same
    /// poll budget rather than failing the item.
    pub call_timeout: Duration,
    /// Sleep between run-status polls.
    pub poll_interval: Duration,
    /// Maximum number of status polls before the item fails with a timeout.
    pub max_poll_attempts: u32,
    /// Number of question ids per database query when enumerating large
    /// id sets. Batching bounds query payload size and must not change
    /// ordering or completeness.
    pub batch_size: usize,
}

impl GenerationConfig {
    /// Default budget for a given assistant id.
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            call_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 120,
            batch_size: 50,
        }
    }
}

/// Server configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// Path to the local database file.
    pub db_path: String,
}

impl ServerConfig {
    /// Read from `QUIZ_ASSIST_PORT` / `QUIZ_ASSIST_DB_PATH` with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("QUIZ_ASSIST_PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "QUIZ_ASSIST_PORT".into(),
                message: format!("not a valid port: {v}"),
            })?,
            Err(_) => 8000,
        };
        let db_path = std::env::var("QUIZ_ASSIST_DB_PATH")
            .unwrap_or_else(|_| "./data/quiz-assist.db".to_string());
        Ok(Self { port, db_path })
    }
}
