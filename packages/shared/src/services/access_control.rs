use crate::models::game::Game;
use crate::models::role::Role;

/// Role of `caller_external_id` with respect to `game`.
pub fn role_for(game: &Game, caller_external_id: &str) -> Role {
    let seat = game.side_of(caller_external_id);
    if game.owner_external_id == caller_external_id {
        return Role::Owner { seat };
    }
    match seat {
        Some(side) => Role::Player { side },
        None => Role::Spectator,
    }
}
