use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use lambda_http::tracing::{debug, error};

use crate::{error::ApiError, middleware::session::CurrentUser, state::AppState};
use shared::models::views::GameView;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/join/{private_id}/{entry_token}",
        get(claim_seat).post(claim_seat),
    )
}

async fn claim_seat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((private_id, entry_token)): Path<(String, String)>,
) -> Result<Json<GameView>, ApiError> {
    let game = state
        .game_service
        .claim_seat(&private_id, &entry_token, &user)
        .await
        .map_err(|e| {
            error!("Seat claim by {} failed: {}", user.external_id, e);
            ApiError::from(e)
        })?;
    debug!("{} joined game {}", user.external_id, game.id);

    state
        .game_service
        .view_of(&game, &user)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to render game {} after join: {}", game.id, e);
            ApiError::from(e)
        })
}
