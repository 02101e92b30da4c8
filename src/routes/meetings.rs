use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::engine::NewMeeting;
use crate::error::EngineError;
use crate::models::{Meeting, MeetingStatus};
use crate::router::AppState;

#[derive(Deserialize)]
pub struct MeetingQuery {
    pub chapter_id: Option<String>,
    pub status: Option<MeetingStatus>,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub user_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}

pub async fn list_meetings(
    State(state): State<AppState>,
    Query(params): Query<MeetingQuery>,
) -> Json<Vec<Meeting>> {
    let store = state.store.read().await;
    let meetings = match &params.chapter_id {
        Some(chapter_id) => store.meetings_by_chapter(chapter_id),
        None => store.meetings.clone(),
    };
    let meetings = match params.status {
        Some(status) => meetings.into_iter().filter(|m| m.status == status).collect(),
        None => meetings,
    };
    Json(meetings)
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Meeting>, EngineError> {
    let store = state.store.read().await;
    store
        .meeting_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| EngineError::not_found("meeting", id))
}

pub async fn create_meeting(
    State(state): State<AppState>,
    Json(req): Json<NewMeeting>,
) -> Result<impl IntoResponse, EngineError> {
    let mut store = state.store.write().await;
    let meeting = store.create_meeting(req)?;
    tracing::info!(meeting_id = %meeting.id, "meeting scheduled");
    Ok((StatusCode::CREATED, Json(meeting)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<Meeting>, EngineError> {
    let mut store = state.store.write().await;
    let meeting = store.submit_feedback(
        &id,
        &req.user_id,
        req.rating,
        req.comment.unwrap_or_default(),
    )?;
    Ok(Json(meeting))
}
