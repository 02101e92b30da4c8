use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::EngineError;
use crate::query::{ChapterDashboard, MemberDashboard, NetworkDashboard};
use crate::router::AppState;

pub async fn member_dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MemberDashboard>, EngineError> {
    let store = state.store.read().await;
    if store.user_by_id(&user_id).is_none() {
        return Err(EngineError::not_found("user", user_id));
    }
    Ok(Json(store.member_dashboard(&user_id)))
}

pub async fn chapter_dashboard(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> Result<Json<ChapterDashboard>, EngineError> {
    let store = state.store.read().await;
    if store.chapter_by_id(&chapter_id).is_none() {
        return Err(EngineError::not_found("chapter", chapter_id));
    }
    Ok(Json(store.chapter_dashboard(&chapter_id)))
}

pub async fn network_dashboard(State(state): State<AppState>) -> Json<NetworkDashboard> {
    let store = state.store.read().await;
    Json(store.network_dashboard())
}
