//! Task status records and per-item results — the shapes pollers see.

use serde::Serialize;

/// Lifecycle status of a generation task.
///
/// `queued → running → {completed | cancelled | failed}`. The terminal
/// states are final: no registry mutator overwrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }
}

/// Outcome of one processed question. Serialized flattened into the
/// result entry: success carries the question material and explanation,
/// failure carries only the error description.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        question: String,
        options: Vec<String>,
        correct_answer: Option<String>,
        explanation: String,
    },
    Failure { error: String },
}

/// One entry in a task's result list. Appended in processing order and
/// immutable afterwards; `index` is 1-based and monotonically increasing
/// across the whole run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub index: u32,
    pub question_id: i64,
    /// Topic label, present on subject-wide runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl ItemResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Failure { .. })
    }
}

/// The full status record for one task. Owned by the registry; pollers
/// receive clones.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    pub progress: u32,
    pub results: Vec<ItemResult>,
    pub error: Option<String>,
}

impl TaskRecord {
    /// A freshly created, not-yet-started task.
    pub fn queued() -> Self {
        Self {
            status: TaskStatus::Queued,
            progress: 0,
            results: Vec::new(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_wire_shape() {
        let result = ItemResult {
            index: 3,
            question_id: 42,
            topic: None,
            outcome: ItemOutcome::Success {
                question: "What is the capital of France?".into(),
                options: vec!["Paris".into(), "Lyon".into()],
                correct_answer: Some("Paris".into()),
                explanation: "Paris is the capital.".into(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "index": 3,
                "questionId": 42,
                "question": "What is the capital of France?",
                "options": ["Paris", "Lyon"],
                "correctAnswer": "Paris",
                "explanation": "Paris is the capital."
            })
        );
    }

    #[test]
    fn failure_result_wire_shape() {
        let result = ItemResult {
            index: 1,
            question_id: 7,
            topic: None,
            outcome: ItemOutcome::Failure {
                error: "No options found".into(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "index": 1,
                "questionId": 7,
                "error": "No options found"
            })
        );
    }

    #[test]
    fn subject_run_results_carry_topic() {
        let result = ItemResult {
            index: 1,
            question_id: 7,
            topic: Some("Anatomy".into()),
            outcome: ItemOutcome::Failure {
                error: "Timeout waiting for assistant response".into(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["topic"], "Anatomy");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }
}
