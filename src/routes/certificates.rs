use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::EngineError;
use crate::models::Certificate;
use crate::router::AppState;

#[derive(Deserialize)]
pub struct CertificateQuery {
    pub user_id: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub user_id: String,
    pub chapter_id: String,
    pub issued_by: Option<String>,
}

pub async fn list_certificates(
    State(state): State<AppState>,
    Query(params): Query<CertificateQuery>,
) -> Json<Vec<Certificate>> {
    let store = state.store.read().await;
    let certificates = match (&params.user_id, params.active_only) {
        (Some(user_id), true) => store.active_certificates_by_user(user_id),
        (Some(user_id), false) => store.certificates_by_user(user_id),
        (None, _) => store.certificates.clone(),
    };
    Json(certificates)
}

/// Evaluate thresholds for one (user, chapter) pair and issue whatever is
/// newly earned. Safe to call repeatedly.
pub async fn evaluate_certificates(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<Vec<Certificate>>, EngineError> {
    let mut store = state.store.write().await;
    let issued = store.evaluate_certificates(
        &req.user_id,
        &req.chapter_id,
        req.issued_by.as_deref().unwrap_or("system"),
    )?;
    if !issued.is_empty() {
        tracing::info!(
            user_id = %req.user_id,
            chapter_id = %req.chapter_id,
            count = issued.len(),
            "certificates issued"
        );
    }
    Ok(Json(issued))
}
