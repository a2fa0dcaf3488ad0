//! Persistence — the question catalog behind an async trait.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{QuestionDetail, QuestionOption, QuestionRow, QuestionStore, SubjectRow, TopicRow};
