use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::engine::AwardPoints;
use crate::error::EngineError;
use crate::models::Point;
use crate::router::AppState;

#[derive(Deserialize)]
pub struct PointsQuery {
    pub user_id: Option<String>,
}

pub async fn list_points(
    State(state): State<AppState>,
    Query(params): Query<PointsQuery>,
) -> Json<Vec<Point>> {
    let store = state.store.read().await;
    let points = match &params.user_id {
        Some(user_id) => store.points_by_user(user_id),
        None => store.points.clone(),
    };
    Json(points)
}

pub async fn award_points(
    State(state): State<AppState>,
    Json(req): Json<AwardPoints>,
) -> Result<impl IntoResponse, EngineError> {
    let mut store = state.store.write().await;
    let point = store.award_points(req)?;
    tracing::info!(
        point_id = %point.id,
        user_id = %point.user_id,
        amount = point.points,
        "points awarded"
    );
    Ok((StatusCode::CREATED, Json(point)))
}
