//! libSQL backend — async `QuestionStore` implementation.
//!
//! Supports local file and in-memory databases. The schema is created
//! idempotently on open.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::traits::{
    QuestionDetail, QuestionOption, QuestionRow, QuestionStore, SubjectRow, TopicRow,
};

/// A question is pending while its explanation is NULL or blank.
const PENDING: &str = "(q.explanation IS NULL OR TRIM(q.explanation) = '')";

/// libSQL database backend.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (tests, fixtures).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS subjects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    category_id INTEGER NOT NULL,
                    name TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_subjects_category ON subjects(category_id);

                CREATE TABLE IF NOT EXISTS topics (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    subject_id INTEGER NOT NULL REFERENCES subjects(id),
                    name TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_topics_subject ON topics(subject_id);

                CREATE TABLE IF NOT EXISTS questions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    question TEXT NOT NULL,
                    explanation TEXT,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS topic_questions (
                    topic_id INTEGER NOT NULL REFERENCES topics(id),
                    question_id INTEGER NOT NULL REFERENCES questions(id),
                    PRIMARY KEY (topic_id, question_id)
                );

                CREATE TABLE IF NOT EXISTS question_options (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    question_id INTEGER NOT NULL REFERENCES questions(id),
                    option_text TEXT NOT NULL,
                    is_correct INTEGER NOT NULL DEFAULT 0
                );
                CREATE INDEX IF NOT EXISTS idx_options_question ON question_options(question_id);
                "#,
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("init_schema: {e}")))?;
        Ok(())
    }

    // ── Seeding helpers (fixtures, admin tooling) ───────────────────

    pub async fn insert_subject(
        &self,
        category_id: i64,
        name: &str,
    ) -> Result<i64, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO subjects (category_id, name) VALUES (?1, ?2)",
                params![category_id, name],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_subject: {e}")))?;
        Ok(self.conn().last_insert_rowid())
    }

    pub async fn insert_topic(&self, subject_id: i64, name: &str) -> Result<i64, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO topics (subject_id, name) VALUES (?1, ?2)",
                params![subject_id, name],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_topic: {e}")))?;
        Ok(self.conn().last_insert_rowid())
    }

    pub async fn insert_question(
        &self,
        question: &str,
        explanation: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO questions (question, explanation) VALUES (?1, ?2)",
                params![question, opt_text(explanation)],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_question: {e}")))?;
        Ok(self.conn().last_insert_rowid())
    }

    pub async fn link_topic_question(
        &self,
        topic_id: i64,
        question_id: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO topic_questions (topic_id, question_id) VALUES (?1, ?2)",
                params![topic_id, question_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("link_topic_question: {e}")))?;
        Ok(())
    }

    pub async fn insert_option(
        &self,
        question_id: i64,
        text: &str,
        is_correct: bool,
    ) -> Result<i64, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO question_options (question_id, option_text, is_correct) VALUES (?1, ?2, ?3)",
                params![question_id, text, is_correct as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_option: {e}")))?;
        Ok(self.conn().last_insert_rowid())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// `?,?,?` placeholder list for an IN clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

async fn collect_ids(mut rows: libsql::Rows, context: &str) -> Result<Vec<i64>, DatabaseError> {
    let mut ids = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Query(format!("{context}: {e}")))?
    {
        let id: i64 = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("{context} row parse: {e}")))?;
        ids.push(id);
    }
    Ok(ids)
}

async fn collect_questions(
    mut rows: libsql::Rows,
    context: &str,
) -> Result<Vec<QuestionRow>, DatabaseError> {
    let mut questions = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Query(format!("{context}: {e}")))?
    {
        questions.push(QuestionRow {
            id: row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("{context} row parse: {e}")))?,
            question: row
                .get(1)
                .map_err(|e| DatabaseError::Query(format!("{context} row parse: {e}")))?,
        });
    }
    Ok(questions)
}

async fn single_count(mut rows: libsql::Rows, context: &str) -> Result<i64, DatabaseError> {
    match rows
        .next()
        .await
        .map_err(|e| DatabaseError::Query(format!("{context}: {e}")))?
    {
        Some(row) => row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("{context} row parse: {e}"))),
        None => Ok(0),
    }
}

#[async_trait]
impl QuestionStore for LibSqlBackend {
    async fn find_subject(
        &self,
        category_id: i64,
        subject_name: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM subjects WHERE category_id = ?1 AND name = ?2",
                params![category_id, subject_name],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_subject: {e}")))?;
        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("find_subject: {e}")))?
        {
            Some(row) => Ok(Some(row.get(0).map_err(|e| {
                DatabaseError::Query(format!("find_subject row parse: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn find_topic(
        &self,
        subject_id: i64,
        topic_name: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM topics WHERE subject_id = ?1 AND name = ?2",
                params![subject_id, topic_name],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_topic: {e}")))?;
        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("find_topic: {e}")))?
        {
            Some(row) => Ok(Some(row.get(0).map_err(|e| {
                DatabaseError::Query(format!("find_topic row parse: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn topics_for_subject(&self, subject_id: i64) -> Result<Vec<TopicRow>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, name FROM topics WHERE subject_id = ?1 ORDER BY id",
                params![subject_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("topics_for_subject: {e}")))?;
        let mut topics = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("topics_for_subject: {e}")))?
        {
            topics.push(TopicRow {
                id: row.get(0).map_err(|e| {
                    DatabaseError::Query(format!("topics_for_subject row parse: {e}"))
                })?,
                name: row.get(1).map_err(|e| {
                    DatabaseError::Query(format!("topics_for_subject row parse: {e}"))
                })?,
            });
        }
        Ok(topics)
    }

    async fn subjects_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<SubjectRow>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, category_id, name FROM subjects WHERE category_id = ?1 ORDER BY id",
                params![category_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("subjects_for_category: {e}")))?;
        let mut subjects = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("subjects_for_category: {e}")))?
        {
            subjects.push(SubjectRow {
                id: row.get(0).map_err(|e| {
                    DatabaseError::Query(format!("subjects_for_category row parse: {e}"))
                })?,
                category_id: row.get(1).map_err(|e| {
                    DatabaseError::Query(format!("subjects_for_category row parse: {e}"))
                })?,
                name: row.get(2).map_err(|e| {
                    DatabaseError::Query(format!("subjects_for_category row parse: {e}"))
                })?,
            });
        }
        Ok(subjects)
    }

    async fn question_ids_for_topic(&self, topic_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let rows = self
            .conn()
            .query(
                "SELECT question_id FROM topic_questions WHERE topic_id = ?1 ORDER BY question_id",
                params![topic_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("question_ids_for_topic: {e}")))?;
        collect_ids(rows, "question_ids_for_topic").await
    }

    async fn questions_missing_explanation(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionRow>, DatabaseError> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT q.id, q.question FROM questions q \
             WHERE q.id IN ({}) AND {PENDING} ORDER BY q.id",
            placeholders(question_ids.len())
        );
        let rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(question_ids.iter().copied()))
            .await
            .map_err(|e| DatabaseError::Query(format!("questions_missing_explanation: {e}")))?;
        collect_questions(rows, "questions_missing_explanation").await
    }

    async fn pending_questions_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Vec<QuestionRow>, DatabaseError> {
        let sql = format!(
            "SELECT q.id, q.question FROM questions q \
             JOIN topic_questions rel ON rel.question_id = q.id \
             WHERE rel.topic_id = ?1 AND {PENDING} ORDER BY q.id"
        );
        let rows = self
            .conn()
            .query(&sql, params![topic_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("pending_questions_for_topic: {e}")))?;
        collect_questions(rows, "pending_questions_for_topic").await
    }

    async fn questions_by_ids(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionRow>, DatabaseError> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, question FROM questions WHERE id IN ({}) ORDER BY id",
            placeholders(question_ids.len())
        );
        let rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(question_ids.iter().copied()))
            .await
            .map_err(|e| DatabaseError::Query(format!("questions_by_ids: {e}")))?;
        collect_questions(rows, "questions_by_ids").await
    }

    async fn unexplained_question_ids(&self) -> Result<Vec<i64>, DatabaseError> {
        let sql = format!("SELECT q.id FROM questions q WHERE {PENDING} ORDER BY q.id");
        let rows = self
            .conn()
            .query(&sql, ())
            .await
            .map_err(|e| DatabaseError::Query(format!("unexplained_question_ids: {e}")))?;
        collect_ids(rows, "unexplained_question_ids").await
    }

    async fn options_for_questions(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>, DatabaseError> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT question_id, option_text, is_correct FROM question_options \
             WHERE question_id IN ({}) ORDER BY id",
            placeholders(question_ids.len())
        );
        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(question_ids.iter().copied()))
            .await
            .map_err(|e| DatabaseError::Query(format!("options_for_questions: {e}")))?;
        let mut options = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("options_for_questions: {e}")))?
        {
            let is_correct: i64 = row.get(2).map_err(|e| {
                DatabaseError::Query(format!("options_for_questions row parse: {e}"))
            })?;
            options.push(QuestionOption {
                question_id: row.get(0).map_err(|e| {
                    DatabaseError::Query(format!("options_for_questions row parse: {e}"))
                })?,
                text: row.get(1).map_err(|e| {
                    DatabaseError::Query(format!("options_for_questions row parse: {e}"))
                })?,
                is_correct: is_correct != 0,
            });
        }
        Ok(options)
    }

    async fn update_explanation(
        &self,
        question_id: i64,
        explanation: &str,
    ) -> Result<u64, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE questions SET explanation = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![explanation, question_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_explanation: {e}")))?;
        debug!(question_id, affected, "Explanation stored");
        Ok(affected)
    }

    async fn explanation(&self, question_id: i64) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT explanation FROM questions WHERE id = ?1",
                params![question_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("explanation: {e}")))?;
        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("explanation: {e}")))?
        {
            // NULL column reads as a get() error; both mean "no explanation".
            Some(row) => Ok(row.get::<String>(0).ok()),
            None => Ok(None),
        }
    }

    async fn clear_explanation(&self, question_id: i64) -> Result<bool, DatabaseError> {
        let current = self.explanation(question_id).await?;
        if current.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Ok(false);
        }
        self.conn()
            .execute(
                "UPDATE questions SET explanation = NULL, updated_at = datetime('now') WHERE id = ?1",
                params![question_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("clear_explanation: {e}")))?;
        Ok(true)
    }

    async fn clear_explanations_for_topic(&self, topic_id: i64) -> Result<u64, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE questions SET explanation = NULL, updated_at = datetime('now') \
                 WHERE id IN (SELECT question_id FROM topic_questions WHERE topic_id = ?1)",
                params![topic_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("clear_explanations_for_topic: {e}")))?;
        Ok(affected)
    }

    async fn pending_count_for_topic(&self, topic_id: i64) -> Result<i64, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM questions q \
             JOIN topic_questions rel ON rel.question_id = q.id \
             WHERE rel.topic_id = ?1 AND {PENDING}"
        );
        let rows = self
            .conn()
            .query(&sql, params![topic_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("pending_count_for_topic: {e}")))?;
        single_count(rows, "pending_count_for_topic").await
    }

    async fn pending_count_for_subject(&self, subject_id: i64) -> Result<i64, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM questions q \
             JOIN topic_questions rel ON rel.question_id = q.id \
             JOIN topics t ON t.id = rel.topic_id \
             WHERE t.subject_id = ?1 AND {PENDING}"
        );
        let rows = self
            .conn()
            .query(&sql, params![subject_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("pending_count_for_subject: {e}")))?;
        single_count(rows, "pending_count_for_subject").await
    }

    async fn unexplained_count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM questions q WHERE {PENDING}");
        let rows = self
            .conn()
            .query(&sql, ())
            .await
            .map_err(|e| DatabaseError::Query(format!("unexplained_count: {e}")))?;
        single_count(rows, "unexplained_count").await
    }

    async fn questions_for_topic(
        &self,
        topic_id: i64,
    ) -> Result<Vec<QuestionDetail>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT q.id, q.question, q.explanation FROM questions q \
                 JOIN topic_questions rel ON rel.question_id = q.id \
                 WHERE rel.topic_id = ?1 ORDER BY q.id",
                params![topic_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("questions_for_topic: {e}")))?;
        let mut questions = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("questions_for_topic: {e}")))?
        {
            questions.push(QuestionDetail {
                id: row.get(0).map_err(|e| {
                    DatabaseError::Query(format!("questions_for_topic row parse: {e}"))
                })?,
                question: row.get(1).map_err(|e| {
                    DatabaseError::Query(format!("questions_for_topic row parse: {e}"))
                })?,
                explanation: row.get::<String>(2).ok(),
            });
        }
        Ok(questions)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.conn()
            .query("SELECT 1", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("health_check: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> LibSqlBackend {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let subject = db.insert_subject(1, "Public Health").await.unwrap();
        let topic = db.insert_topic(subject, "Epidemiology").await.unwrap();
        let q1 = db.insert_question("What is incidence?", None).await.unwrap();
        let q2 = db
            .insert_question("What is prevalence?", Some("Already explained."))
            .await
            .unwrap();
        let q3 = db.insert_question("What is a cohort?", Some("  ")).await.unwrap();
        for q in [q1, q2, q3] {
            db.link_topic_question(topic, q).await.unwrap();
        }
        db.insert_option(q1, "New cases over time", true).await.unwrap();
        db.insert_option(q1, "All current cases", false).await.unwrap();
        db
    }

    #[tokio::test]
    async fn resolution_and_enumeration() {
        let db = seeded().await;
        let subject = db.find_subject(1, "Public Health").await.unwrap().unwrap();
        let topic = db.find_topic(subject, "Epidemiology").await.unwrap().unwrap();
        assert!(db.find_subject(1, "Nope").await.unwrap().is_none());
        assert!(db.find_topic(subject, "Nope").await.unwrap().is_none());

        let ids = db.question_ids_for_topic(topic).await.unwrap();
        assert_eq!(ids.len(), 3);

        // Blank-string explanations count as pending alongside NULL ones.
        let pending = db.questions_missing_explanation(&ids).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(db.pending_count_for_topic(topic).await.unwrap(), 2);
        assert_eq!(db.pending_count_for_subject(subject).await.unwrap(), 2);
        assert_eq!(db.unexplained_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn options_preserve_stored_order() {
        let db = seeded().await;
        let ids = db.unexplained_question_ids().await.unwrap();
        let options = db.options_for_questions(&ids).await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].text, "New cases over time");
        assert!(options[0].is_correct);
        assert!(!options[1].is_correct);
    }

    #[tokio::test]
    async fn update_explanation_is_idempotent() {
        let db = seeded().await;
        let ids = db.unexplained_question_ids().await.unwrap();
        let id = ids[0];

        let first = db.update_explanation(id, "Because reasons.").await.unwrap();
        assert_eq!(first, 1);
        let second = db.update_explanation(id, "Because reasons.").await.unwrap();
        assert_eq!(second, 1);

        assert_eq!(
            db.explanation(id).await.unwrap().as_deref(),
            Some("Because reasons.")
        );
        // Re-running leaves the same end state.
        assert!(!db.unexplained_question_ids().await.unwrap().contains(&id));
    }

    #[tokio::test]
    async fn clear_explanation_reports_whether_one_existed() {
        let db = seeded().await;
        let subject = db.find_subject(1, "Public Health").await.unwrap().unwrap();
        let topic = db.find_topic(subject, "Epidemiology").await.unwrap().unwrap();
        let ids = db.question_ids_for_topic(topic).await.unwrap();

        // q2 holds an explanation, q1 does not.
        assert!(db.clear_explanation(ids[1]).await.unwrap());
        assert!(!db.clear_explanation(ids[0]).await.unwrap());
        assert_eq!(db.unexplained_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn clear_explanations_for_topic_clears_all() {
        let db = seeded().await;
        let subject = db.find_subject(1, "Public Health").await.unwrap().unwrap();
        let topic = db.find_topic(subject, "Epidemiology").await.unwrap().unwrap();

        let cleared = db.clear_explanations_for_topic(topic).await.unwrap();
        assert_eq!(cleared, 3);
        assert_eq!(db.pending_count_for_topic(topic).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn file_backed_database_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = LibSqlBackend::new_local(&dir.path().join("quiz.db"))
            .await
            .unwrap();
        let id = db.insert_question("What is incidence?", None).await.unwrap();
        db.update_explanation(id, "New cases over time.").await.unwrap();
        assert_eq!(
            db.explanation(id).await.unwrap().as_deref(),
            Some("New cases over time.")
        );
    }

    #[tokio::test]
    async fn empty_id_set_short_circuits() {
        let db = seeded().await;
        assert!(db.questions_missing_explanation(&[]).await.unwrap().is_empty());
        assert!(db.options_for_questions(&[]).await.unwrap().is_empty());
        assert!(db.questions_by_ids(&[]).await.unwrap().is_empty());
    }
}
