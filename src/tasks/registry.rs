//! Task registry — in-memory mapping from task id to status record and to
//! the running task's cancellation handle.
//!
//! Status records are kept for the lifetime of the process so callers can
//! poll a task long after it finished; the running map only holds entries
//! for in-flight tasks. A task id present in the status map but absent from
//! the running map is either not yet started or already finished/cancelled.
//!
//! Writer discipline: each record is mutated only by the executor that owns
//! the task and by `request_cancel`. Pollers get cloned snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{ItemResult, TaskRecord, TaskStatus};

/// Cooperative cancellation token handed to an executor at spawn time.
///
/// `request_cancel` latches it; the executor polls `is_cancelled` at its
/// checkpoints (top of the item loop, each status-poll iteration) and
/// unwinds. Never preemptive.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A registered in-flight task.
struct RunningTask {
    cancel: CancelFlag,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

/// Registry of generation tasks: status by id, running handle by id.
#[derive(Default)]
pub struct TaskRegistry {
    statuses: RwLock<HashMap<Uuid, TaskRecord>>,
    running: RwLock<HashMap<Uuid, RunningTask>>,
}

impl TaskRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Allocate a task id and insert a queued record, immediately visible
    /// to concurrent pollers.
    pub async fn create_task(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.statuses.write().await.insert(id, TaskRecord::queued());
        info!(task_id = %id, "Task created");
        id
    }

    /// Snapshot of a task's record. `None` means the id was never issued —
    /// records are never evicted.
    pub async fn snapshot(&self, id: Uuid) -> Option<TaskRecord> {
        self.statuses.read().await.get(&id).cloned()
    }

    /// Register the running handle for a task as its executor starts.
    pub async fn register(&self, id: Uuid, handle: JoinHandle<()>, cancel: CancelFlag) {
        self.running
            .write()
            .await
            .insert(id, RunningTask { cancel, handle });
    }

    /// Whether the task still has a running handle.
    pub async fn is_running(&self, id: Uuid) -> bool {
        self.running.read().await.contains_key(&id)
    }

    /// Remove the running handle after natural completion or failure.
    pub async fn unregister(&self, id: Uuid) {
        self.running.write().await.remove(&id);
    }

    /// Request cooperative cancellation.
    ///
    /// If the task is still running: latch its flag, mark the record
    /// cancelled, and drop the handle entry. If it already finished (or
    /// never existed) this is a no-op — calling it twice, or after natural
    /// completion, never errors and never rewrites a terminal status.
    pub async fn request_cancel(&self, id: Uuid) {
        let entry = self.running.write().await.remove(&id);
        match entry {
            Some(task) => {
                task.cancel.cancel();
                let mut statuses = self.statuses.write().await;
                if let Some(record) = statuses.get_mut(&id) {
                    record.status = TaskStatus::Cancelled;
                    record.error = Some("Cancelled by user".to_string());
                }
                info!(task_id = %id, "Task cancelled by user");
            }
            None => {
                info!(task_id = %id, "Cancel requested for task that is not running");
            }
        }
    }

    // ── Executor-side mutators ──────────────────────────────────────
    //
    // All of these leave terminal records untouched, so a late write from
    // an executor that lost a cancellation race cannot resurrect a task.

    /// Transition a queued task to running.
    pub async fn mark_running(&self, id: Uuid) {
        let mut statuses = self.statuses.write().await;
        if let Some(record) = statuses.get_mut(&id) {
            if !record.status.is_terminal() {
                record.status = TaskStatus::Running;
            }
        }
    }

    /// Append an item result and advance progress to its index.
    pub async fn record_result(&self, id: Uuid, result: ItemResult) {
        let mut statuses = self.statuses.write().await;
        if let Some(record) = statuses.get_mut(&id) {
            record.progress = result.index;
            record.results.push(result);
        }
    }

    /// Mark a task completed. `note` lands in the error field the way the
    /// wire format reports informational notes ("All questions already
    /// explained").
    pub async fn complete(&self, id: Uuid, note: Option<String>) {
        let mut statuses = self.statuses.write().await;
        if let Some(record) = statuses.get_mut(&id) {
            if record.status.is_terminal() {
                return;
            }
            record.status = TaskStatus::Completed;
            record.error = note;
            info!(task_id = %id, progress = record.progress, "Task completed");
        }
    }

    /// Mark a task failed with a fatal error message.
    pub async fn fail(&self, id: Uuid, message: String) {
        let mut statuses = self.statuses.write().await;
        if let Some(record) = statuses.get_mut(&id) {
            if record.status.is_terminal() {
                return;
            }
            warn!(task_id = %id, error = %message, "Task failed");
            record.status = TaskStatus::Failed;
            record.error = Some(message);
        }
    }

    /// Mark a task cancelled from the executor side (cancellation observed
    /// at a checkpoint).
    pub async fn mark_cancelled(&self, id: Uuid) {
        let mut statuses = self.statuses.write().await;
        if let Some(record) = statuses.get_mut(&id) {
            if record.status.is_terminal() {
                return;
            }
            record.status = TaskStatus::Cancelled;
            record.error = Some("Cancelled by user".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::model::ItemOutcome;

    fn failure(index: u32, question_id: i64) -> ItemResult {
        ItemResult {
            index,
            question_id,
            topic: None,
            outcome: ItemOutcome::Failure {
                error: "No options found".into(),
            },
        }
    }

    #[tokio::test]
    async fn create_task_is_immediately_visible() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Queued);
        assert_eq!(record.progress, 0);
        assert!(record.results.is_empty());
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn unknown_id_has_no_snapshot() {
        let registry = TaskRegistry::new();
        assert!(registry.snapshot(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn cancel_running_task_latches_flag_and_unregisters() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        let cancel = CancelFlag::new();
        let handle = tokio::spawn(async {});
        registry.register(id, handle, cancel.clone()).await;
        registry.mark_running(id).await;
        assert!(registry.is_running(id).await);

        registry.request_cancel(id).await;

        assert!(cancel.is_cancelled());
        assert!(!registry.is_running(id).await);
        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);
        assert_eq!(record.error.as_deref(), Some("Cancelled by user"));
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        let handle = tokio::spawn(async {});
        registry.register(id, handle, CancelFlag::new()).await;

        registry.request_cancel(id).await;
        registry.request_cancel(id).await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_noop() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        registry.complete(id, None).await;
        registry.unregister(id).await;

        registry.request_cancel(id).await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn cancel_unknown_task_does_not_panic() {
        let registry = TaskRegistry::new();
        registry.request_cancel(Uuid::new_v4()).await;
    }

    #[tokio::test]
    async fn record_result_advances_progress() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        registry.mark_running(id).await;

        registry.record_result(id, failure(1, 10)).await;
        registry.record_result(id, failure(2, 11)).await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.progress, 2);
        assert_eq!(record.results.len(), 2);
        assert_eq!(record.results[0].index, 1);
        assert_eq!(record.results[1].index, 2);
    }

    #[tokio::test]
    async fn terminal_status_is_never_overwritten() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        let handle = tokio::spawn(async {});
        registry.register(id, handle, CancelFlag::new()).await;
        registry.request_cancel(id).await;

        // A racing executor trying to finish after the cancel loses.
        registry.complete(id, None).await;
        registry.fail(id, "boom".into()).await;
        registry.mark_running(id).await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);
        assert_eq!(record.error.as_deref(), Some("Cancelled by user"));
    }

    #[tokio::test]
    async fn complete_with_note_sets_message() {
        let registry = TaskRegistry::new();
        let id = registry.create_task().await;
        registry
            .complete(id, Some("All questions already explained".into()))
            .await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(
            record.error.as_deref(),
            Some("All questions already explained")
        );
    }
}
