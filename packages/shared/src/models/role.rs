use serde::{Deserialize, Serialize};

use crate::models::game::Side;

/// What a caller is allowed to do with one game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Creator of the game; may additionally sit at one of the seats.
    Owner { seat: Option<Side> },
    Player { side: Side },
    Spectator,
}

impl Role {
    /// Side this caller may move for.
    pub fn seat(&self) -> Option<Side> {
        match self {
            Role::Owner { seat } => *seat,
            Role::Player { side } => Some(*side),
            Role::Spectator => None,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner { .. })
    }
}
