use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::error::EngineError;
use crate::models::{Membership, MembershipStatus};
use crate::router::AppState;

#[derive(Deserialize)]
pub struct MembershipQuery {
    pub user_id: Option<String>,
    pub chapter_id: Option<String>,
    pub status: Option<MembershipStatus>,
}

#[derive(Deserialize)]
pub struct CreateMembershipRequest {
    pub user_id: String,
    pub chapter_id: String,
}

#[derive(Deserialize)]
pub struct ApproveMembershipRequest {
    pub approved_by: String,
    pub expected_version: Option<u64>,
}

#[derive(Deserialize)]
pub struct RejectMembershipRequest {
    pub approved_by: String,
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
}

pub async fn list_memberships(
    State(state): State<AppState>,
    Query(params): Query<MembershipQuery>,
) -> Json<Vec<Membership>> {
    let store = state.store.read().await;
    let memberships = match (&params.user_id, &params.chapter_id) {
        (Some(user_id), _) => store.memberships_by_user(user_id),
        (None, Some(chapter_id)) => store.memberships_by_chapter(chapter_id),
        (None, None) => store.memberships.clone(),
    };
    let memberships = match params.status {
        Some(status) => memberships
            .into_iter()
            .filter(|m| m.status == status)
            .collect(),
        None => memberships,
    };
    Json(memberships)
}

pub async fn create_membership(
    State(state): State<AppState>,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let mut store = state.store.write().await;
    let membership = store.request_membership(&req.user_id, &req.chapter_id)?;
    tracing::info!(
        membership_id = %membership.id,
        chapter_id = %req.chapter_id,
        "membership requested"
    );
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn approve_membership(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApproveMembershipRequest>,
) -> Result<Json<Membership>, EngineError> {
    let mut store = state.store.write().await;
    let membership = store.approve_membership(&id, &req.approved_by, req.expected_version)?;
    tracing::info!(membership_id = %id, approved_by = %req.approved_by, "membership approved");
    Ok(Json(membership))
}

pub async fn reject_membership(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectMembershipRequest>,
) -> Result<Json<Membership>, EngineError> {
    let mut store = state.store.write().await;
    let membership =
        store.reject_membership(&id, &req.approved_by, req.reason, req.expected_version)?;
    tracing::info!(membership_id = %id, "membership rejected");
    Ok(Json(membership))
}
