use chrono::Duration;
use std::sync::Arc;

use shared::repositories::game_repository::GameRepository;
use shared::repositories::user_repository::UserRepository;
use shared::services::game_service::GameService;
use shared::services::identity_service::IdentityService;
use shared::services::user_service::UserService;

use crate::config::IdentitySettings;

#[derive(Clone)]
pub struct AppState {
    pub identity_service: Arc<IdentityService>,
    pub user_service: Arc<UserService>,
    pub game_service: Arc<GameService>,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        identity: &IdentitySettings,
    ) -> Self {
        let mut identity_service =
            IdentityService::new(user_repository.clone(), identity.jwt_secret.clone());
        if let Some(max_age) = identity.max_age_secs.and_then(Duration::try_seconds) {
            identity_service = identity_service.with_max_age(max_age);
        }

        AppState {
            identity_service: Arc::new(identity_service),
            user_service: Arc::new(UserService::new(user_repository.clone())),
            game_service: Arc::new(GameService::new(game_repository, user_repository)),
            cookie_name: Arc::from(identity.cookie_name.as_str()),
        }
    }
}
