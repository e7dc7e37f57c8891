use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::game::{GameStatus, Side};
use crate::models::role::Role;

/// State of one seat as shown to the game owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeatView {
    Open { entry_token: String },
    Taken { display_name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagementView {
    pub game_id: String,
    pub private_id: String,
    pub white: SeatView,
    pub black: SeatView,
}

/// Board as shown to a player or a spectator. Never carries entry tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameView {
    pub game_id: String,
    pub role: Role,
    pub position: String,
    pub side_to_move: Side,
    pub status: GameStatus,
    pub in_check: bool,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
    pub legal_moves: Vec<String>,
    pub last_move_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub game_id: String,
    pub side_to_move: Side,
    pub status: GameStatus,
    pub last_move_at: DateTime<Utc>,
}
