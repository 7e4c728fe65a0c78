use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::api::error::{api_error, ApiError};
use crate::infrastructure::app_state::AppState;

// Re-export Claims for use in route handlers
pub use crate::infrastructure::auth::Claims;

/// Extract the bearer token from a header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Require a valid player token and expose its claims to handlers
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Missing bearer token"))?;

    let claims = state
        .jwt_service
        .verify(token)
        .map_err(|e| api_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string()))?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// A token only grants access to the room it was issued for
pub fn ensure_room_access(claims: &Claims, room_id: &str) -> Result<(), ApiError> {
    if claims.room_id != room_id {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "NOT_IN_ROOM",
            "Token was not issued for this room",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_room_access() {
        let claims = Claims {
            player_id: "p1".into(),
            room_id: "room-1".into(),
            exp: 0,
            iat: 0,
        };
        assert!(ensure_room_access(&claims, "room-1").is_ok());
        let (status, _) = ensure_room_access(&claims, "room-2").unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
