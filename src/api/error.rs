use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::application::{GameError, Missing};
use crate::domain::repositories::RepositoryError;

/// Error body returned by every route
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
            details: None,
        }),
    )
}

/// Map a use case failure to its status and machine code
pub fn game_error(e: GameError) -> ApiError {
    let (status, code) = match &e {
        GameError::NotFound(Missing::Room) => (StatusCode::NOT_FOUND, "ROOM_NOT_FOUND"),
        GameError::NotFound(Missing::Player) => (StatusCode::NOT_FOUND, "PLAYER_NOT_FOUND"),
        GameError::InvalidPhase { .. } => (StatusCode::CONFLICT, "INVALID_PHASE"),
        GameError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        GameError::NotYourTurn => (StatusCode::CONFLICT, "NOT_YOUR_TURN"),
        GameError::InsufficientPlayers { .. } => (StatusCode::CONFLICT, "INSUFFICIENT_PLAYERS"),
        GameError::NoVotesCast => (StatusCode::CONFLICT, "NO_VOTES_CAST"),
        GameError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        GameError::Repository(RepositoryError::Conflict(_)) => {
            (StatusCode::CONFLICT, "CONCURRENT_UPDATE")
        }
        GameError::Repository(_) => {
            tracing::error!("Store failure: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    code: "INTERNAL_ERROR".to_string(),
                    details: Some(e.to_string()),
                }),
            );
        }
    };

    api_error(status, code, e.to_string())
}
