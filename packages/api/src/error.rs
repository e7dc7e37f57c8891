use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lambda_http::tracing::error;
use serde::Serialize;

use shared::services::errors::{
    game_service_errors::GameServiceError, identity_service_errors::IdentityServiceError,
    user_service_errors::UserServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    IdentityService(IdentityServiceError),
    UserService(UserServiceError),
    GameService(GameServiceError),
    /// A handler ran without the session layer binding a user.
    MissingSession,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl From<IdentityServiceError> for ApiError {
    fn from(error: IdentityServiceError) -> Self {
        ApiError::IdentityService(error)
    }
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        ApiError::UserService(error)
    }
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

const UNAVAILABLE: (StatusCode, &str) = (StatusCode::SERVICE_UNAVAILABLE, "repository_unavailable");
const INTERNAL: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "internal_error");

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::IdentityService(IdentityServiceError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "invalid_token")
            }
            ApiError::IdentityService(IdentityServiceError::RepositoryUnavailable(_)) => UNAVAILABLE,
            ApiError::IdentityService(IdentityServiceError::JwtError(_)) => INTERNAL,

            ApiError::UserService(UserServiceError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "user_not_found")
            }
            ApiError::UserService(UserServiceError::ValidationError(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::UserService(UserServiceError::RepositoryError(_)) => UNAVAILABLE,

            ApiError::GameService(err) => match err {
                GameServiceError::GameNotFound => (StatusCode::NOT_FOUND, "game_not_found"),
                GameServiceError::InvalidEntryKey => (StatusCode::NOT_FOUND, "invalid_entry_key"),
                GameServiceError::AlreadyClaimed => (StatusCode::CONFLICT, "already_claimed"),
                GameServiceError::AlreadySeated => (StatusCode::CONFLICT, "already_seated"),
                GameServiceError::NotOwner => (StatusCode::FORBIDDEN, "not_owner"),
                GameServiceError::NotAPlayer => (StatusCode::FORBIDDEN, "not_a_player"),
                GameServiceError::NotYourTurn => (StatusCode::CONFLICT, "not_your_turn"),
                GameServiceError::IllegalMove(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "illegal_move")
                }
                GameServiceError::InvalidMoveRequest(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_move_request")
                }
                GameServiceError::GameOver => (StatusCode::CONFLICT, "game_over"),
                GameServiceError::StaleGameState => (StatusCode::CONFLICT, "stale_game_state"),
                GameServiceError::RepositoryUnavailable(_) => UNAVAILABLE,
                GameServiceError::CorruptGame(_) => INTERNAL,
            },

            ApiError::MissingSession => INTERNAL,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Server-side failures keep their details in the logs.
        let message = if status.is_server_error() {
            error!("Request failed: {:?}", self);
            if status == StatusCode::SERVICE_UNAVAILABLE {
                "Service temporarily unavailable".to_string()
            } else {
                "Internal server error".to_string()
            }
        } else {
            match &self {
                ApiError::IdentityService(e) => e.to_string(),
                ApiError::UserService(e) => e.to_string(),
                ApiError::GameService(e) => e.to_string(),
                ApiError::MissingSession => String::new(),
            }
        };

        (
            status,
            Json(ErrorBody {
                error: code,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GameServiceError::GameNotFound, StatusCode::NOT_FOUND),
            (GameServiceError::InvalidEntryKey, StatusCode::NOT_FOUND),
            (GameServiceError::AlreadyClaimed, StatusCode::CONFLICT),
            (GameServiceError::AlreadySeated, StatusCode::CONFLICT),
            (GameServiceError::NotOwner, StatusCode::FORBIDDEN),
            (GameServiceError::NotAPlayer, StatusCode::FORBIDDEN),
            (GameServiceError::NotYourTurn, StatusCode::CONFLICT),
            (
                GameServiceError::IllegalMove("e2e5".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                GameServiceError::InvalidMoveRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (GameServiceError::GameOver, StatusCode::CONFLICT),
            (GameServiceError::StaleGameState, StatusCode::CONFLICT),
            (
                GameServiceError::RepositoryUnavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GameServiceError::CorruptGame("bad fen".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_user_errors() {
        assert_eq!(
            ApiError::from(UserServiceError::ValidationError("long".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(IdentityServiceError::RepositoryUnavailable("down".to_string()))
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
