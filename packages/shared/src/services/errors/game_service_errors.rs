use std::fmt;

use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::services::errors::board_service_errors::BoardServiceError;

#[derive(Debug)]
pub enum GameServiceError {
    GameNotFound,
    /// The game exists but neither seat was ever unlocked by this token.
    InvalidEntryKey,
    AlreadyClaimed,
    AlreadySeated,
    NotOwner,
    NotAPlayer,
    NotYourTurn,
    IllegalMove(String),
    InvalidMoveRequest(String),
    GameOver,
    StaleGameState,
    /// A stored position failed to decode.
    CorruptGame(String),
    RepositoryUnavailable(String),
}

impl fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameServiceError::GameNotFound => write!(f, "Game not found"),
            GameServiceError::InvalidEntryKey => write!(f, "Invalid entry key"),
            GameServiceError::AlreadyClaimed => write!(f, "Seat has already been claimed"),
            GameServiceError::AlreadySeated => {
                write!(f, "You already hold the other seat in this game")
            }
            GameServiceError::NotOwner => write!(f, "Only the game owner can do that"),
            GameServiceError::NotAPlayer => write!(f, "You are not a player in this game"),
            GameServiceError::NotYourTurn => write!(f, "It is not your turn"),
            GameServiceError::IllegalMove(mv) => write!(f, "Illegal move: {}", mv),
            GameServiceError::InvalidMoveRequest(msg) => write!(f, "Invalid move request: {}", msg),
            GameServiceError::GameOver => write!(f, "Game is already over"),
            GameServiceError::StaleGameState => {
                write!(f, "Game changed while the move was being applied")
            }
            GameServiceError::CorruptGame(msg) => write!(f, "Corrupt game state: {}", msg),
            GameServiceError::RepositoryUnavailable(msg) => {
                write!(f, "Repository unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        GameServiceError::RepositoryUnavailable(err.to_string())
    }
}

impl From<UserRepositoryError> for GameServiceError {
    fn from(err: UserRepositoryError) -> Self {
        GameServiceError::RepositoryUnavailable(err.to_string())
    }
}

impl From<BoardServiceError> for GameServiceError {
    fn from(err: BoardServiceError) -> Self {
        match err {
            BoardServiceError::IllegalMove(mv) => GameServiceError::IllegalMove(mv),
            BoardServiceError::GameOver => GameServiceError::GameOver,
            BoardServiceError::InvalidSquare(_) | BoardServiceError::InvalidPromotion(_) => {
                GameServiceError::InvalidMoveRequest(err.to_string())
            }
            BoardServiceError::InvalidPosition(msg) => GameServiceError::CorruptGame(msg),
        }
    }
}
