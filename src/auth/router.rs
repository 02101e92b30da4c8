use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::engine::NewUser;
use crate::error::EngineError;
use crate::models::{User, UserRole};
use crate::router::AppState;

/// A user as returned by the API: everything except the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub college_id: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            college_id: user.college_id,
            bio: user.bio,
            phone: user.phone,
            semester: user.semester,
            department: user.department,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(self::post::signup))
        .route("/login", post(self::post::login))
}

mod post {
    use super::*;

    pub async fn signup(
        State(state): State<AppState>,
        Json(req): Json<NewUser>,
    ) -> Result<impl IntoResponse, EngineError> {
        let mut store = state.store.write().await;
        let user = store.register_user(req)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
    }

    pub async fn login(
        State(state): State<AppState>,
        Json(req): Json<LoginRequest>,
    ) -> impl IntoResponse {
        let store = state.store.read().await;
        let user = store
            .user_by_email(&req.email)
            .filter(|u| u.is_active && verify_password(&req.password, &u.password_hash))
            .cloned();
        match user {
            Some(user) => Json(UserProfile::from(user)).into_response(),
            None => (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response(),
        }
    }
}
