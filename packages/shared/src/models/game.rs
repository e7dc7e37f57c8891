use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const ENTRY_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrawReason {
    InsufficientMaterial,
    FiftyMoveRule,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Side },
    Stalemate,
    Draw { reason: DrawReason },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// One of the two player seats of a game.
///
/// A seat starts out `Unclaimed` holding a one-time entry token and moves to
/// `Claimed` exactly once. The consumed token stays on the claimed seat so a
/// replayed link can be told apart from a bogus one; it is never shown to
/// anybody once consumed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Seat {
    Unclaimed {
        token: String,
    },
    Claimed {
        external_id: String,
        consumed_token: String,
    },
}

impl Seat {
    pub fn open() -> Self {
        Seat::Unclaimed {
            token: generate_entry_token(),
        }
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self, Seat::Claimed { .. })
    }

    pub fn holder(&self) -> Option<&str> {
        match self {
            Seat::Claimed { external_id, .. } => Some(external_id),
            Seat::Unclaimed { .. } => None,
        }
    }

    pub fn is_held_by(&self, external_id: &str) -> bool {
        self.holder() == Some(external_id)
    }

    /// Entry token still available for claiming.
    pub fn open_token(&self) -> Option<&str> {
        match self {
            Seat::Unclaimed { token } => Some(token),
            Seat::Claimed { .. } => None,
        }
    }

    /// Whether this seat was (or still is) unlocked by `token`.
    pub fn matches_token(&self, token: &str) -> bool {
        match self {
            Seat::Unclaimed { token: t } => t == token,
            Seat::Claimed { consumed_token, .. } => consumed_token == token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: String,
    pub owner_external_id: String,
    pub private_id: String,
    pub white_seat: Seat,
    pub black_seat: Seat,
    pub position: String,
    pub last_move_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(owner_external_id: &str) -> Self {
        let now = Utc::now();
        Game {
            id: Uuid::new_v4().to_string(),
            owner_external_id: owner_external_id.to_string(),
            private_id: Uuid::new_v4().to_string(),
            white_seat: Seat::open(),
            black_seat: Seat::open(),
            position: STARTING_FEN.to_string(),
            last_move_at: now,
            created_at: now,
        }
    }

    pub fn seat(&self, side: Side) -> &Seat {
        match side {
            Side::White => &self.white_seat,
            Side::Black => &self.black_seat,
        }
    }

    pub fn seat_mut(&mut self, side: Side) -> &mut Seat {
        match side {
            Side::White => &mut self.white_seat,
            Side::Black => &mut self.black_seat,
        }
    }

    /// Side whose seat was unlocked by `token`, if any.
    pub fn side_for_token(&self, token: &str) -> Option<Side> {
        [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.seat(*side).matches_token(token))
    }

    /// Side held by `external_id`, if any.
    pub fn side_of(&self, external_id: &str) -> Option<Side> {
        [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.seat(*side).is_held_by(external_id))
    }
}

fn generate_entry_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ENTRY_TOKEN_LEN)
        .map(char::from)
        .collect()
}
