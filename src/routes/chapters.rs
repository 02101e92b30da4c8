use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::engine::NewChapter;
use crate::error::EngineError;
use crate::models::{Chapter, ChapterStatus};
use crate::router::AppState;

#[derive(Deserialize)]
pub struct ChapterQuery {
    pub college_id: Option<String>,
    pub status: Option<ChapterStatus>,
}

#[derive(Deserialize, Default)]
pub struct ApproveChapterRequest {
    pub expected_version: Option<u64>,
}

#[derive(Deserialize, Default)]
pub struct RejectChapterRequest {
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
}

pub async fn list_chapters(
    State(state): State<AppState>,
    Query(params): Query<ChapterQuery>,
) -> Json<Vec<Chapter>> {
    let store = state.store.read().await;
    let chapters = match &params.college_id {
        Some(college_id) => store.chapters_by_college(college_id),
        None => store.chapters.clone(),
    };
    let chapters = match params.status {
        Some(status) => chapters.into_iter().filter(|c| c.status == status).collect(),
        None => chapters,
    };
    Json(chapters)
}

pub async fn get_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chapter>, EngineError> {
    let store = state.store.read().await;
    store
        .chapter_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| EngineError::not_found("chapter", id))
}

pub async fn create_chapter(
    State(state): State<AppState>,
    Json(req): Json<NewChapter>,
) -> Result<impl IntoResponse, EngineError> {
    let mut store = state.store.write().await;
    let chapter = store.create_chapter(req)?;
    tracing::info!(chapter_id = %chapter.id, "chapter application submitted");
    Ok((StatusCode::CREATED, Json(chapter)))
}

pub async fn approve_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApproveChapterRequest>,
) -> Result<Json<Chapter>, EngineError> {
    let mut store = state.store.write().await;
    let chapter = store.approve_chapter(&id, req.expected_version)?;
    tracing::info!(chapter_id = %id, "chapter approved");
    Ok(Json(chapter))
}

pub async fn reject_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectChapterRequest>,
) -> Result<Json<Chapter>, EngineError> {
    let mut store = state.store.write().await;
    let chapter = store.reject_chapter(&id, req.reason, req.expected_version)?;
    tracing::info!(chapter_id = %id, "chapter rejected");
    Ok(Json(chapter))
}
