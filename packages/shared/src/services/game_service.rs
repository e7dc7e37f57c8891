use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::game::{Game, Seat, Side};
use crate::models::move_request::MoveRequest;
use crate::models::user::{User, DEFAULT_DISPLAY_NAME};
use crate::models::views::{GameSummary, GameView, ManagementView, SeatView};
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::access_control::role_for;
use crate::services::board_service::{BoardService, Position};
use crate::services::errors::game_service_errors::GameServiceError;

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Game creation, seat claiming and move handling on top of the repositories.
#[derive(Clone)]
pub struct GameService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl GameService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        GameService {
            game_repository,
            user_repository,
        }
    }

    pub async fn create_game(&self, owner: &User) -> Result<Game, GameServiceError> {
        let game = Game::new(&owner.external_id);
        self.game_repository.create_game(&game).await?;
        info!(game_id = %game.id, owner = %owner.external_id, "Created game");
        Ok(game)
    }

    /// Claim the seat unlocked by `entry_token` in the game behind `private_id`.
    pub async fn claim_seat(
        &self,
        private_id: &str,
        entry_token: &str,
        claimant: &User,
    ) -> Result<Game, GameServiceError> {
        let mut game = self
            .game_repository
            .get_game_by_private_id(private_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)?;

        let side = game
            .side_for_token(entry_token)
            .ok_or(GameServiceError::InvalidEntryKey)?;

        if game.seat(side).is_claimed() {
            warn!(game_id = %game.id, %side, "Entry link replayed");
            return Err(GameServiceError::AlreadyClaimed);
        }
        if game.seat(side.opponent()).is_held_by(&claimant.external_id) {
            return Err(GameServiceError::AlreadySeated);
        }

        let swapped = self
            .game_repository
            .compare_and_swap_seat(&game.id, side, entry_token, &claimant.external_id)
            .await?;
        if !swapped {
            warn!(game_id = %game.id, %side, "Lost seat claim race");
            return Err(GameServiceError::AlreadyClaimed);
        }

        *game.seat_mut(side) = Seat::Claimed {
            external_id: claimant.external_id.clone(),
            consumed_token: entry_token.to_string(),
        };
        info!(game_id = %game.id, %side, player = %claimant.external_id, "Seat claimed");
        Ok(game)
    }

    pub async fn request_move(
        &self,
        game_id: &str,
        caller: &User,
        request: &MoveRequest,
    ) -> Result<Game, GameServiceError> {
        validate_move_request(request)?;

        let mut game = self.load_game(game_id).await?;
        let side = role_for(&game, &caller.external_id)
            .seat()
            .ok_or(GameServiceError::NotAPlayer)?;

        let position = decode_position(&game)?;
        if BoardService::side_to_move(&position) != side {
            return Err(GameServiceError::NotYourTurn);
        }

        let next = BoardService::apply_move(
            &position,
            &request.from_square,
            &request.to_square,
            request.promotion_piece.as_deref(),
        )?;
        let next_fen = BoardService::encode(&next);
        let moved_at = Utc::now();

        let swapped = self
            .game_repository
            .compare_and_swap_position(&game.id, &game.position, &next_fen, moved_at)
            .await?;
        if !swapped {
            warn!(game_id = %game.id, "Position changed underneath move");
            return Err(GameServiceError::StaleGameState);
        }

        info!(
            game_id = %game.id,
            %side,
            from = %request.from_square,
            to = %request.to_square,
            "Move applied"
        );
        game.position = next_fen;
        game.last_move_at = moved_at;
        Ok(game)
    }

    /// Seat links and holders, for the owner only.
    pub async fn management_view(
        &self,
        game_id: &str,
        caller: &User,
    ) -> Result<ManagementView, GameServiceError> {
        let game = self.load_game(game_id).await?;
        if !role_for(&game, &caller.external_id).is_owner() {
            return Err(GameServiceError::NotOwner);
        }

        Ok(ManagementView {
            white: self.seat_view(game.seat(Side::White)).await?,
            black: self.seat_view(game.seat(Side::Black)).await?,
            game_id: game.id,
            private_id: game.private_id,
        })
    }

    pub async fn game_view(
        &self,
        game_id: &str,
        caller: &User,
    ) -> Result<GameView, GameServiceError> {
        let game = self.load_game(game_id).await?;
        self.view_of(&game, caller).await
    }

    /// Board as seen by `caller`. Legal moves are listed only when it is the
    /// caller's turn.
    pub async fn view_of(&self, game: &Game, caller: &User) -> Result<GameView, GameServiceError> {
        let role = role_for(game, &caller.external_id);
        let position = decode_position(game)?;
        let side_to_move = BoardService::side_to_move(&position);
        let status = BoardService::status(&position);

        let legal_moves = if role.seat() == Some(side_to_move) && !status.is_over() {
            BoardService::legal_moves(&position)
        } else {
            Vec::new()
        };

        Ok(GameView {
            game_id: game.id.clone(),
            role,
            position: game.position.clone(),
            side_to_move,
            status,
            in_check: BoardService::is_check(&position),
            white_player: self.player_name(game.seat(Side::White)).await?,
            black_player: self.player_name(game.seat(Side::Black)).await?,
            legal_moves,
            last_move_at: game.last_move_at,
        })
    }

    pub async fn list_active_games(
        &self,
        limit: usize,
    ) -> Result<Vec<GameSummary>, GameServiceError> {
        let games = self.game_repository.list_games(limit).await?;

        games
            .into_iter()
            .map(|game| {
                let position = decode_position(&game)?;
                Ok(GameSummary {
                    side_to_move: BoardService::side_to_move(&position),
                    status: BoardService::status(&position),
                    last_move_at: game.last_move_at,
                    game_id: game.id,
                })
            })
            .collect()
    }

    async fn load_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.game_repository
            .get_game(game_id)
            .await?
            .ok_or(GameServiceError::GameNotFound)
    }

    async fn seat_view(&self, seat: &Seat) -> Result<SeatView, GameServiceError> {
        match seat {
            Seat::Unclaimed { token } => Ok(SeatView::Open {
                entry_token: token.clone(),
            }),
            Seat::Claimed { external_id, .. } => Ok(SeatView::Taken {
                display_name: self.display_name(external_id).await?,
            }),
        }
    }

    async fn player_name(&self, seat: &Seat) -> Result<Option<String>, GameServiceError> {
        match seat.holder() {
            Some(external_id) => Ok(Some(self.display_name(external_id).await?)),
            None => Ok(None),
        }
    }

    async fn display_name(&self, external_id: &str) -> Result<String, GameServiceError> {
        match self.user_repository.get_user_by_external_id(external_id).await {
            Ok(user) => Ok(user.display_name),
            Err(UserRepositoryError::NotFound) => Ok(DEFAULT_DISPLAY_NAME.to_string()),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_move_request(request: &MoveRequest) -> Result<(), GameServiceError> {
    if request.from_square.trim().is_empty() || request.to_square.trim().is_empty() {
        return Err(GameServiceError::InvalidMoveRequest(
            "from_square and to_square are required".to_string(),
        ));
    }
    if matches!(&request.promotion_piece, Some(piece) if piece.trim().is_empty()) {
        return Err(GameServiceError::InvalidMoveRequest(
            "promotion_piece cannot be blank".to_string(),
        ));
    }
    Ok(())
}

fn decode_position(game: &Game) -> Result<Position, GameServiceError> {
    BoardService::decode(&game.position).map_err(GameServiceError::from)
}
