//! REST endpoints — task start/status/cancel plus catalog reads.
//!
//! The handlers translate directly to registry, pipeline, and store
//! operations; no business logic lives here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::pipeline::{GenerationPipeline, GenerationScope};
use crate::store::QuestionStore;
use crate::tasks::TaskRegistry;

/// Shared state for all API routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub registry: Arc<TaskRegistry>,
    pub store: Arc<dyn QuestionStore>,
}

/// Build the API router. CORS is wide open — the admin frontend is served
/// from a different origin.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/generate/topic", post(start_topic_generation))
        .route("/api/generate/subject", post(start_subject_generation))
        .route("/api/generate/backlog", post(start_backlog_generation))
        .route("/api/tasks/{id}", get(task_status))
        .route("/api/tasks/{id}/cancel", post(cancel_task))
        .route("/api/questions/remaining-count", post(remaining_count))
        .route("/api/subjects/pending-count", post(subject_pending_count))
        .route("/api/questions/unexplained-count", get(unexplained_count))
        .route("/api/subjects", post(list_subjects))
        .route("/api/topics", post(list_topics))
        .route("/api/questions/by-topic", post(questions_by_topic))
        .route("/api/questions/delete-explanation", post(delete_explanation))
        .route(
            "/api/topics/delete-explanations",
            post(delete_topic_explanations),
        )
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicSelector {
    category_id: i64,
    subject_name: String,
    topic_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectSelector {
    category_id: i64,
    subject_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategorySelector {
    category_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectIdSelector {
    subject_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicIdSelector {
    topic_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionIdSelector {
    question_id: i64,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn started(task_id: Uuid) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "started", "taskId": task_id }))
}

fn db_error(e: DatabaseError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
    )
}

// ── Task endpoints ──────────────────────────────────────────────────

/// POST /api/generate/topic — start explanation generation for one topic.
async fn start_topic_generation(
    State(state): State<AppState>,
    Json(body): Json<TopicSelector>,
) -> impl IntoResponse {
    let task_id = state
        .pipeline
        .spawn(GenerationScope::Topic {
            category_id: body.category_id,
            subject_name: body.subject_name,
            topic_name: body.topic_name,
        })
        .await;
    started(task_id)
}

/// POST /api/generate/subject — start generation for every topic under a
/// subject.
async fn start_subject_generation(
    State(state): State<AppState>,
    Json(body): Json<SubjectSelector>,
) -> impl IntoResponse {
    let task_id = state
        .pipeline
        .spawn(GenerationScope::Subject {
            category_id: body.category_id,
            subject_name: body.subject_name,
        })
        .await;
    started(task_id)
}

/// POST /api/generate/backlog — start generation for every unexplained
/// question in the store.
async fn start_backlog_generation(State(state): State<AppState>) -> impl IntoResponse {
    let task_id = state.pipeline.spawn(GenerationScope::Backlog).await;
    started(task_id)
}

/// GET /api/tasks/{id} — status snapshot for polling.
async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "status": "not_found" })),
        )
            .into_response()
    };
    let Ok(task_id) = Uuid::parse_str(&id) else {
        return not_found();
    };
    match state.registry.snapshot(task_id).await {
        Some(record) => Json(record).into_response(),
        None => not_found(),
    }
}

/// POST /api/tasks/{id}/cancel — request cooperative cancellation.
/// Succeeds no matter whether the task is running, finished, or unknown.
async fn cancel_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    if let Ok(task_id) = Uuid::parse_str(&id) {
        state.registry.request_cancel(task_id).await;
    }
    StatusCode::OK
}

// ── Counts ──────────────────────────────────────────────────────────

/// POST /api/questions/remaining-count — pending questions under a topic.
/// Unresolvable selectors answer zero, not an error.
async fn remaining_count(
    State(state): State<AppState>,
    Json(body): Json<TopicSelector>,
) -> impl IntoResponse {
    let count = async {
        let Some(subject_id) = state
            .store
            .find_subject(body.category_id, &body.subject_name)
            .await?
        else {
            return Ok(0);
        };
        let Some(topic_id) = state
            .store
            .find_topic(subject_id, &body.topic_name)
            .await?
        else {
            return Ok(0);
        };
        state.store.pending_count_for_topic(topic_id).await
    }
    .await;

    match count {
        Ok(count) => Json(serde_json::json!({ "count": count })).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/subjects/pending-count — pending questions across a subject.
async fn subject_pending_count(
    State(state): State<AppState>,
    Json(body): Json<SubjectSelector>,
) -> impl IntoResponse {
    match state
        .store
        .find_subject(body.category_id, &body.subject_name)
        .await
    {
        Ok(Some(subject_id)) => match state.store.pending_count_for_subject(subject_id).await {
            Ok(count) => Json(serde_json::json!({ "count": count })).into_response(),
            Err(e) => db_error(e).into_response(),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "status": "error", "error": "Subject not found" })),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// GET /api/questions/unexplained-count — global backlog size.
async fn unexplained_count(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.unexplained_count().await {
        Ok(count) => Json(serde_json::json!({ "count": count })).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

// ── Catalog reads ───────────────────────────────────────────────────

/// POST /api/subjects — subjects in a category.
async fn list_subjects(
    State(state): State<AppState>,
    Json(body): Json<CategorySelector>,
) -> impl IntoResponse {
    match state.store.subjects_for_category(body.category_id).await {
        Ok(subjects) => Json(subjects).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/topics — topics under a subject.
async fn list_topics(
    State(state): State<AppState>,
    Json(body): Json<SubjectIdSelector>,
) -> impl IntoResponse {
    match state.store.topics_for_subject(body.subject_id).await {
        Ok(topics) => Json(topics).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/questions/by-topic — full question rows linked to a topic.
async fn questions_by_topic(
    State(state): State<AppState>,
    Json(body): Json<TopicIdSelector>,
) -> impl IntoResponse {
    match state.store.questions_for_topic(body.topic_id).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

// ── Explanation maintenance ─────────────────────────────────────────

/// POST /api/questions/delete-explanation — clear one explanation.
async fn delete_explanation(
    State(state): State<AppState>,
    Json(body): Json<QuestionIdSelector>,
) -> impl IntoResponse {
    match state.store.clear_explanation(body.question_id).await {
        Ok(true) => Json(serde_json::json!({
            "status": "success",
            "message": format!("Explanation removed for questionId={}", body.question_id)
        }))
        .into_response(),
        Ok(false) => Json(serde_json::json!({
            "status": "no",
            "message": "No explanation to remove"
        }))
        .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

/// POST /api/topics/delete-explanations — clear every explanation under a
/// topic resolved by name.
async fn delete_topic_explanations(
    State(state): State<AppState>,
    Json(body): Json<TopicSelector>,
) -> impl IntoResponse {
    let resolve = async {
        let subject_id = state
            .store
            .find_subject(body.category_id, &body.subject_name)
            .await?;
        match subject_id {
            Some(subject_id) => state.store.find_topic(subject_id, &body.topic_name).await,
            None => Ok(None),
        }
    }
    .await;

    match resolve {
        Ok(Some(topic_id)) => match state.store.clear_explanations_for_topic(topic_id).await {
            Ok(cleared) => Json(serde_json::json!({
                "status": "success",
                "message": format!("Explanations removed from {cleared} questions")
            }))
            .into_response(),
            Err(e) => db_error(e).into_response(),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "status": "error", "error": "Topic not found" })),
        )
            .into_response(),
        Err(e) => db_error(e).into_response(),
    }
}

// ── Health ──────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok", "database": "connected" }))
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "status": "unhealthy",
                "database": "error",
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}
