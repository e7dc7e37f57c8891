use axum::{extract::State, routing::{get, post}, Json, Router};
use lambda_http::tracing::{debug, error};

use crate::{error::ApiError, middleware::session::CurrentUser, state::AppState};
use shared::models::auth::requests::ChangeDisplayNameRequest;
use shared::models::user::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_user))
        .route("/user/display_name", post(change_display_name))
}

async fn get_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn change_display_name(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ChangeDisplayNameRequest>,
) -> Result<Json<User>, ApiError> {
    let updated = state
        .user_service
        .change_display_name(&user, request.display_name.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to change display name for {}: {}", user.external_id, e);
            ApiError::from(e)
        })?;
    debug!("Display name changed for {}", user.external_id);
    Ok(Json(updated))
}
