use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::engine::NewCollege;
use crate::error::EngineError;
use crate::models::College;
use crate::router::AppState;

#[derive(Deserialize)]
pub struct CollegeQuery {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

/// Browse or search colleges. Without a query this returns the first N
/// colleges, the way the join flow's college picker uses it.
pub async fn list_colleges(
    State(state): State<AppState>,
    Query(params): Query<CollegeQuery>,
) -> Json<Vec<College>> {
    let store = state.store.read().await;
    let query = params.query.as_deref().unwrap_or_default();
    let mut colleges = if query.is_empty() {
        store.colleges.clone()
    } else {
        store.search_colleges(query)
    };
    // The picker shows the first 10 colleges when nothing has been typed.
    if let Some(limit) = params.limit.or(query.is_empty().then_some(10)) {
        colleges.truncate(limit);
    }
    Json(colleges)
}

pub async fn get_college(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<College>, EngineError> {
    let store = state.store.read().await;
    store
        .college_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| EngineError::not_found("college", id))
}

pub async fn create_college(
    State(state): State<AppState>,
    Json(req): Json<NewCollege>,
) -> Result<impl IntoResponse, EngineError> {
    let mut store = state.store.write().await;
    let college = store.create_college(req)?;
    tracing::info!(college_id = %college.id, "college registered");
    Ok((StatusCode::CREATED, Json(college)))
}
