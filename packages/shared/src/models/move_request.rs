use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    pub from_square: String,             // e.g., "e2"
    pub to_square: String,               // e.g., "e4"
    pub promotion_piece: Option<String>, // e.g., "q" for queen
}

impl MoveRequest {
    pub fn new(from_square: &str, to_square: &str) -> Self {
        MoveRequest {
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            promotion_piece: None,
        }
    }

    pub fn with_promotion(from_square: &str, to_square: &str, promotion_piece: &str) -> Self {
        MoveRequest {
            from_square: from_square.to_string(),
            to_square: to_square.to_string(),
            promotion_piece: Some(promotion_piece.to_string()),
        }
    }
}
