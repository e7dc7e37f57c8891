use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lambda_http::tracing::{debug, error};
use serde::Deserialize;

use crate::{error::ApiError, middleware::session::CurrentUser, state::AppState};
use shared::models::move_request::MoveRequest;
use shared::models::views::{GameSummary, GameView, ManagementView};
use shared::services::errors::game_service_errors::GameServiceError;
use shared::services::game_service::DEFAULT_LIST_LIMIT;

const MAX_LIST_LIMIT: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ListGamesQuery {
    pub limit: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{game_id}", get(get_game))
        .route("/games/{game_id}/manage", get(manage_game))
        .route("/games/{game_id}/moves", post(submit_move))
}

async fn create_game(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<ManagementView>), ApiError> {
    let game = state.game_service.create_game(&user).await.map_err(|e| {
        error!("Failed to create game for {}: {}", user.external_id, e);
        ApiError::from(e)
    })?;
    let view = state
        .game_service
        .management_view(&game.id, &user)
        .await
        .map_err(|e| {
            error!("Failed to load new game {}: {}", game.id, e);
            ApiError::from(e)
        })?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    state
        .game_service
        .list_active_games(limit)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list games: {}", e);
            ApiError::from(e)
        })
}

async fn get_game(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(game_id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    state
        .game_service
        .game_view(&game_id, &user)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load game {}: {}", game_id, e);
            ApiError::from(e)
        })
}

async fn manage_game(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(game_id): Path<String>,
) -> Result<Json<ManagementView>, ApiError> {
    state
        .game_service
        .management_view(&game_id, &user)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load management view for {}: {}", game_id, e);
            ApiError::from(e)
        })
}

async fn submit_move(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(game_id): Path<String>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Json(request) =
        body.map_err(|e| GameServiceError::InvalidMoveRequest(e.body_text()))?;

    let game = state
        .game_service
        .request_move(&game_id, &user, &request)
        .await
        .map_err(|e| {
            error!("Move rejected in game {}: {}", game_id, e);
            ApiError::from(e)
        })?;
    debug!(
        "Move {}{} accepted in game {}",
        request.from_square, request.to_square, game_id
    );

    state
        .game_service
        .view_of(&game, &user)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to render game {} after move: {}", game_id, e);
            ApiError::from(e)
        })
}
