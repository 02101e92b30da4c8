use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors produced by the lifecycle engine and query layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("stale version for {entity} {id}: expected {expected}, found {actual}")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match self {
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::InvalidStateTransition(_) | EngineError::DuplicateEntity(_) => {
                StatusCode::CONFLICT
            }
            EngineError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Conflict { .. } => StatusCode::PRECONDITION_FAILED,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::not_found("chapter", "42");
        assert_eq!(err.to_string(), "chapter 42 not found");

        let err = EngineError::Conflict {
            entity: "membership",
            id: "7".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "stale version for membership 7: expected 2, found 3"
        );
    }
}
