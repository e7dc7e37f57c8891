use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum BoardServiceError {
    InvalidSquare(String),
    InvalidPromotion(String),
    IllegalMove(String),
    GameOver,
    InvalidPosition(String),
}

impl fmt::Display for BoardServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardServiceError::InvalidSquare(sq) => write!(f, "Invalid square: {}", sq),
            BoardServiceError::InvalidPromotion(p) => write!(f, "Invalid promotion piece: {}", p),
            BoardServiceError::IllegalMove(mv) => write!(f, "Illegal move: {}", mv),
            BoardServiceError::GameOver => write!(f, "Game is already over"),
            BoardServiceError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
        }
    }
}

impl std::error::Error for BoardServiceError {}
