//! `QuestionStore` trait — single async interface for the question catalog.
//!
//! The pipeline only ever touches the store through this trait; errors
//! surface as `DatabaseError` values, never as panics.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// A subject row.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

/// A topic row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TopicRow {
    pub id: i64,
    pub name: String,
}

/// A question needing (or holding) an explanation, as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub id: i64,
    pub question: String,
}

/// An answer option for one question, in stored order.
#[derive(Debug, Clone)]
pub struct QuestionOption {
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Full question detail for catalog reads.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: i64,
    pub question: String,
    pub explanation: Option<String>,
}

/// Backend-agnostic store for subjects, topics, questions, and options.
///
/// A question is *pending* when its explanation is NULL or blank.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    // ── Resolution ──────────────────────────────────────────────────

    /// Resolve a subject by category and name.
    async fn find_subject(
        &self,
        category_id: i64,
        subject_name: &str,
    ) -> Result<Option<i64>, DatabaseError>;

    /// Resolve a topic by subject and name.
    async fn find_topic(
        &self,
        subject_id: i64,
        topic_name: &str,
    ) -> Result<Option<i64>, DatabaseError>;

    /// All topics under a subject.
    async fn topics_for_subject(&self, subject_id: i64) -> Result<Vec<TopicRow>, DatabaseError>;

    /// All subjects in a category.
    async fn subjects_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<SubjectRow>, DatabaseError>;

    // ── Enumeration ─────────────────────────────────────────────────

    /// Ids of all questions linked to a topic, ascending.
    async fn question_ids_for_topic(&self, topic_id: i64) -> Result<Vec<i64>, DatabaseError>;

    /// Of the given ids, the questions still pending an explanation.
    /// Returned ascending by id; callers batch the id list themselves.
    async fn questions_missing_explanation(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionRow>, DatabaseError>;

    /// Pending questions linked to a topic, ascending by id.
    async fn pending_questions_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Vec<QuestionRow>, DatabaseError>;

    /// Questions by id, ascending, regardless of pending state.
    async fn questions_by_ids(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionRow>, DatabaseError>;

    /// Ids of every pending question in the store, ascending.
    async fn unexplained_question_ids(&self) -> Result<Vec<i64>, DatabaseError>;

    /// Options for the given question ids, in stored order.
    async fn options_for_questions(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>, DatabaseError>;

    // ── Explanations ────────────────────────────────────────────────

    /// Write an explanation for a question. Returns affected row count;
    /// writing the same explanation twice leaves the store unchanged.
    async fn update_explanation(
        &self,
        question_id: i64,
        explanation: &str,
    ) -> Result<u64, DatabaseError>;

    /// Current explanation for a question, if any.
    async fn explanation(&self, question_id: i64) -> Result<Option<String>, DatabaseError>;

    /// Clear one question's explanation. Returns whether there was one.
    async fn clear_explanation(&self, question_id: i64) -> Result<bool, DatabaseError>;

    /// Clear every explanation under a topic. Returns the cleared count.
    async fn clear_explanations_for_topic(&self, topic_id: i64) -> Result<u64, DatabaseError>;

    // ── Counts & catalog reads ──────────────────────────────────────

    /// Number of pending questions under a topic.
    async fn pending_count_for_topic(&self, topic_id: i64) -> Result<i64, DatabaseError>;

    /// Number of pending questions across all topics of a subject.
    async fn pending_count_for_subject(&self, subject_id: i64) -> Result<i64, DatabaseError>;

    /// Number of pending questions in the whole store.
    async fn unexplained_count(&self) -> Result<i64, DatabaseError>;

    /// Full question rows linked to a topic.
    async fn questions_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Vec<QuestionDetail>, DatabaseError>;

    /// Cheap connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
