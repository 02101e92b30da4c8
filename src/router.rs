use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::router as auth_router;
use crate::routes::{
    certificates::{evaluate_certificates, list_certificates},
    chapters::{approve_chapter, create_chapter, get_chapter, list_chapters, reject_chapter},
    colleges::{create_college, get_college, list_colleges},
    dashboard::{chapter_dashboard, member_dashboard, network_dashboard},
    meetings::{create_meeting, get_meeting, list_meetings, submit_feedback},
    memberships::{
        approve_membership, create_membership, list_memberships, reject_membership,
    },
    points::{award_points, list_points},
};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
}

pub fn create_router(store: Arc<RwLock<Store>>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/colleges", get(list_colleges).post(create_college))
        .route("/colleges/{id}", get(get_college))
        .route("/chapters", get(list_chapters).post(create_chapter))
        .route("/chapters/{id}", get(get_chapter))
        .route("/chapters/{id}/approve", post(approve_chapter))
        .route("/chapters/{id}/reject", post(reject_chapter))
        .route("/memberships", get(list_memberships).post(create_membership))
        .route("/memberships/{id}/approve", post(approve_membership))
        .route("/memberships/{id}/reject", post(reject_membership))
        .route("/meetings", get(list_meetings).post(create_meeting))
        .route("/meetings/{id}", get(get_meeting))
        .route("/meetings/{id}/feedback", post(submit_feedback))
        .route("/points", get(list_points).post(award_points))
        .route("/certificates", get(list_certificates))
        .route("/certificates/evaluate", post(evaluate_certificates))
        .route("/dashboard/member/{user_id}", get(member_dashboard))
        .route("/dashboard/chapter/{chapter_id}", get(chapter_dashboard))
        .route("/dashboard/network", get(network_dashboard))
        .merge(auth_router::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
