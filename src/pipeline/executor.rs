//! The pipeline executor — drives one generation task from start to a
//! terminal status.
//!
//! Shape of every run: resolve selectors to ids, enumerate the pending
//! question set (batched id queries, order-preserving), then process items
//! strictly sequentially with a cancellation check and a cooperative yield
//! at every iteration boundary. Per-item faults are recorded and never
//! abort the task; resolution faults fail the whole task.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::assistant::{AssistantClient, ContentBlock, RunStatus};
use crate::config::GenerationConfig;
use crate::error::{AssistantError, DatabaseError, ItemError, PipelineError};
use crate::store::{QuestionOption, QuestionRow, QuestionStore};
use crate::tasks::{CancelFlag, ItemOutcome, ItemResult, TaskRegistry};

use super::{GenerationScope, build_prompt, extract_explanation, label_options};

/// Executes generation tasks against the store and the generation service.
pub struct GenerationPipeline {
    store: Arc<dyn QuestionStore>,
    assistant: Arc<dyn AssistantClient>,
    registry: Arc<TaskRegistry>,
    config: GenerationConfig,
}

impl GenerationPipeline {
    pub fn new(
        store: Arc<dyn QuestionStore>,
        assistant: Arc<dyn AssistantClient>,
        registry: Arc<TaskRegistry>,
        config: GenerationConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            assistant,
            registry,
            config,
        })
    }

    /// Create a task for the given scope, launch its unit of work, and
    /// return the task id. The caller polls the registry for progress.
    pub async fn spawn(self: &Arc<Self>, scope: GenerationScope) -> Uuid {
        let task_id = self.registry.create_task().await;
        let cancel = CancelFlag::new();

        // The spawned future waits for the handle to be registered before
        // touching the registry, so a fast task cannot finish (and
        // unregister) before its own registration lands.
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel::<()>();

        let pipeline = Arc::clone(self);
        let flag = cancel.clone();
        let handle = tokio::spawn(async move {
            let _ = ready_rx.await;
            match pipeline.run(task_id, scope, &flag).await {
                Ok(()) => {}
                Err(PipelineError::Cancelled) => {
                    info!(task_id = %task_id, "Task cancelled at checkpoint");
                    pipeline.registry.mark_cancelled(task_id).await;
                }
                Err(e) => pipeline.registry.fail(task_id, e.to_string()).await,
            }
            pipeline.registry.unregister(task_id).await;
        });

        self.registry.register(task_id, handle, cancel).await;
        let _ = ready_tx.send(());
        task_id
    }

    async fn run(
        &self,
        task_id: Uuid,
        scope: GenerationScope,
        cancel: &CancelFlag,
    ) -> Result<(), PipelineError> {
        self.registry.mark_running(task_id).await;
        match scope {
            GenerationScope::Topic {
                category_id,
                subject_name,
                topic_name,
            } => {
                self.run_topic(task_id, cancel, category_id, &subject_name, &topic_name)
                    .await
            }
            GenerationScope::Subject {
                category_id,
                subject_name,
            } => {
                self.run_subject(task_id, cancel, category_id, &subject_name)
                    .await
            }
            GenerationScope::Backlog => self.run_backlog(task_id, cancel).await,
        }
    }

    // ── Scopes ──────────────────────────────────────────────────────

    async fn run_topic(
        &self,
        task_id: Uuid,
        cancel: &CancelFlag,
        category_id: i64,
        subject_name: &str,
        topic_name: &str,
    ) -> Result<(), PipelineError> {
        let subject_id = self
            .store
            .find_subject(category_id, subject_name)
            .await?
            .ok_or(PipelineError::NotFound { entity: "Subject" })?;
        let topic_id = self
            .store
            .find_topic(subject_id, topic_name)
            .await?
            .ok_or(PipelineError::NotFound { entity: "Topic" })?;

        let ids = self.store.question_ids_for_topic(topic_id).await?;
        if ids.is_empty() {
            return Err(PipelineError::NoQuestions);
        }

        let questions = self.fetch_pending(&ids).await?;
        if questions.is_empty() {
            self.registry
                .complete(task_id, Some("All questions already explained".into()))
                .await;
            return Ok(());
        }

        info!(
            task_id = %task_id,
            topic = topic_name,
            pending = questions.len(),
            "Topic generation started"
        );

        let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let options = self.fetch_options(&question_ids).await?;

        let mut index = 0;
        self.process_questions(task_id, cancel, &questions, &options, None, &mut index)
            .await?;
        self.registry.complete(task_id, None).await;
        Ok(())
    }

    async fn run_subject(
        &self,
        task_id: Uuid,
        cancel: &CancelFlag,
        category_id: i64,
        subject_name: &str,
    ) -> Result<(), PipelineError> {
        let subject_id = self
            .store
            .find_subject(category_id, subject_name)
            .await?
            .ok_or(PipelineError::NotFound { entity: "Subject" })?;
        let topics = self.store.topics_for_subject(subject_id).await?;
        if topics.is_empty() {
            return Err(PipelineError::NoTopics);
        }

        info!(
            task_id = %task_id,
            subject = subject_name,
            topics = topics.len(),
            "Subject-wide generation started"
        );

        // One index across all topics — never reset per topic.
        let mut index = 0;
        for topic in &topics {
            let questions = self.store.pending_questions_for_topic(topic.id).await?;
            if questions.is_empty() {
                continue;
            }
            let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
            let options = self.fetch_options(&question_ids).await?;
            self.process_questions(
                task_id,
                cancel,
                &questions,
                &options,
                Some(&topic.name),
                &mut index,
            )
            .await?;
        }

        self.registry.complete(task_id, None).await;
        Ok(())
    }

    async fn run_backlog(&self, task_id: Uuid, cancel: &CancelFlag) -> Result<(), PipelineError> {
        let ids = self.store.unexplained_question_ids().await?;
        if ids.is_empty() {
            self.registry
                .complete(
                    task_id,
                    Some("All questions already have explanations".into()),
                )
                .await;
            return Ok(());
        }

        info!(task_id = %task_id, pending = ids.len(), "Backlog generation started");

        // One index across all batches — never reset per batch.
        let mut index = 0;
        for batch in ids.chunks(self.config.batch_size) {
            let questions = self.store.questions_by_ids(batch).await?;
            let options = self.store.options_for_questions(batch).await?;
            self.process_questions(task_id, cancel, &questions, &options, None, &mut index)
                .await?;
        }

        self.registry.complete(task_id, None).await;
        Ok(())
    }

    // ── Enumeration helpers ─────────────────────────────────────────

    /// Fetch the pending subset of an id set in `batch_size` chunks.
    /// The result is the order-preserving union across chunks.
    async fn fetch_pending(&self, ids: &[i64]) -> Result<Vec<QuestionRow>, DatabaseError> {
        let mut questions = Vec::new();
        for batch in ids.chunks(self.config.batch_size) {
            questions.extend(self.store.questions_missing_explanation(batch).await?);
        }
        Ok(questions)
    }

    async fn fetch_options(&self, ids: &[i64]) -> Result<Vec<QuestionOption>, DatabaseError> {
        let mut options = Vec::new();
        for batch in ids.chunks(self.config.batch_size) {
            options.extend(self.store.options_for_questions(batch).await?);
        }
        Ok(options)
    }

    // ── Item loop ───────────────────────────────────────────────────

    async fn process_questions(
        &self,
        task_id: Uuid,
        cancel: &CancelFlag,
        questions: &[QuestionRow],
        options: &[QuestionOption],
        topic: Option<&str>,
        index: &mut u32,
    ) -> Result<(), PipelineError> {
        for question in questions {
            *index += 1;
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            // Let concurrently arriving cancel requests land before the
            // expensive part of the iteration.
            tokio::task::yield_now().await;

            let question_options: Vec<&QuestionOption> = options
                .iter()
                .filter(|o| o.question_id == question.id)
                .collect();

            match self
                .generate_explanation(cancel, question, &question_options)
                .await
            {
                Ok(explanation) => {
                    self.registry
                        .record_result(
                            task_id,
                            ItemResult {
                                index: *index,
                                question_id: question.id,
                                topic: topic.map(str::to_string),
                                outcome: ItemOutcome::Success {
                                    question: question.question.clone(),
                                    options: question_options
                                        .iter()
                                        .map(|o| o.text.clone())
                                        .collect(),
                                    correct_answer: question_options
                                        .iter()
                                        .find(|o| o.is_correct)
                                        .map(|o| o.text.clone()),
                                    explanation,
                                },
                            },
                        )
                        .await;
                }
                Err(ItemError::Cancelled) => return Err(PipelineError::Cancelled),
                Err(e) => {
                    warn!(
                        task_id = %task_id,
                        question_id = question.id,
                        index = *index,
                        error = %e,
                        "Question failed"
                    );
                    self.registry
                        .record_result(
                            task_id,
                            ItemResult {
                                index: *index,
                                question_id: question.id,
                                topic: topic.map(str::to_string),
                                outcome: ItemOutcome::Failure {
                                    error: e.to_string(),
                                },
                            },
                        )
                        .await;
                }
            }
        }
        Ok(())
    }

    /// Generate and persist the explanation for one question.
    ///
    /// Every fault here is an [`ItemError`]; only `Cancelled` escapes the
    /// item — everything else is downgraded to a failure entry by the
    /// caller.
    async fn generate_explanation(
        &self,
        cancel: &CancelFlag,
        question: &QuestionRow,
        options: &[&QuestionOption],
    ) -> Result<String, ItemError> {
        if options.is_empty() {
            return Err(ItemError::NoOptions);
        }

        let labeled = label_options(options);
        let prompt = build_prompt(&question.question, &labeled);

        let thread = self
            .call(self.assistant.create_thread(&prompt))
            .await?
            .ok_or(ItemError::ThreadCreation)?;
        let run = self
            .call(self.assistant.create_run(&thread, &self.config.assistant_id))
            .await?
            .ok_or(ItemError::RunCreation)?;

        // Poll until the run completes. A timed-out status call is a gap,
        // not a failure — it spends one attempt and polling goes on.
        let mut completed = false;
        for _ in 0..self.config.max_poll_attempts {
            if cancel.is_cancelled() {
                return Err(ItemError::Cancelled);
            }
            if let Some(status) = self.call(self.assistant.run_status(&thread, &run)).await? {
                if status == RunStatus::Completed {
                    completed = true;
                    break;
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
        if !completed {
            return Err(ItemError::PollTimeout);
        }

        let messages = self
            .call(self.assistant.list_messages(&thread))
            .await?
            .ok_or(ItemError::NoMessage)?;
        let first_block = messages
            .first()
            .and_then(|m| m.content.first())
            .ok_or(ItemError::NoMessage)?;

        match first_block {
            ContentBlock::Text { text } => {
                let explanation = extract_explanation(text);
                let affected = self
                    .store
                    .update_explanation(question.id, &explanation)
                    .await
                    .map_err(|_| ItemError::PersistFailed)?;
                if affected == 0 {
                    return Err(ItemError::PersistFailed);
                }
                Ok(explanation)
            }
            other => {
                // Non-text answer: record a synthesized explanation in the
                // results but leave the store untouched.
                warn!(
                    question_id = question.id,
                    kind = other.kind(),
                    "Assistant returned a non-text block; skipping persistence"
                );
                Ok(format!(
                    "[Assistant refused to answer; returned a {} block]",
                    other.kind()
                ))
            }
        }
    }

    /// Wrap a generation-service call in the per-call timeout. `Ok(None)`
    /// means the call timed out and the caller should treat it as a
    /// retryable gap within its own budget.
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, AssistantError>>,
    ) -> Result<Option<T>, AssistantError> {
        match tokio::time::timeout(self.config.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Assistant call timed out; treating as no result");
                Ok(None)
            }
        }
    }
}
