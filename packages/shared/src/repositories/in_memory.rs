//! Process-local repositories for local runs and tests.
//!
//! Every compare-and-swap runs under one write guard, which gives the same
//! single-row atomicity the DynamoDB conditional updates provide.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::game::{Game, Seat, Side};
use crate::models::user::User;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::game_repository::{most_recent_first, GameRepository};
use crate::repositories::user_repository::UserRepository;

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id)
            || users.values().any(|u| u.external_id == user.external_id)
        {
            return Err(UserRepositoryError::AlreadyExists);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<User, UserRepositoryError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned()
            .ok_or(UserRepositoryError::NotFound)
    }

    async fn touch_last_seen(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or(UserRepositoryError::NotFound)?;
        user.last_seen_at = at;
        Ok(())
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or(UserRepositoryError::NotFound)?;
        user.display_name = display_name.to_string();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryGameRepository {
    games: Arc<RwLock<HashMap<String, Game>>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            return Err(GameRepositoryError::AlreadyExists);
        }
        games.insert(game.id.clone(), game.clone());
        Ok(())
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        Ok(self.games.read().await.get(game_id).cloned())
    }

    async fn get_game_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Option<Game>, GameRepositoryError> {
        let games = self.games.read().await;
        Ok(games.values().find(|g| g.private_id == private_id).cloned())
    }

    async fn compare_and_swap_seat(
        &self,
        game_id: &str,
        side: Side,
        expected_token: &str,
        external_id: &str,
    ) -> Result<bool, GameRepositoryError> {
        let mut games = self.games.write().await;
        let Some(game) = games.get_mut(game_id) else {
            return Ok(false);
        };
        if game.seat(side).open_token() != Some(expected_token)
            || game.seat(side.opponent()).is_held_by(external_id)
        {
            return Ok(false);
        }
        *game.seat_mut(side) = Seat::Claimed {
            external_id: external_id.to_string(),
            consumed_token: expected_token.to_string(),
        };
        Ok(true)
    }

    async fn compare_and_swap_position(
        &self,
        game_id: &str,
        expected_position: &str,
        new_position: &str,
        moved_at: DateTime<Utc>,
    ) -> Result<bool, GameRepositoryError> {
        let mut games = self.games.write().await;
        match games.get_mut(game_id) {
            Some(game) if game.position == expected_position => {
                game.position = new_position.to_string();
                game.last_move_at = moved_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_games(&self, limit: usize) -> Result<Vec<Game>, GameRepositoryError> {
        let games = self.games.read().await.values().cloned().collect();
        Ok(most_recent_first(games, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_seat_swap_only_once() {
        let repo = InMemoryGameRepository::new();
        let game = Game::new("owner");
        let token = game.white_seat.open_token().unwrap().to_string();
        repo.create_game(&game).await.unwrap();

        assert!(repo
            .compare_and_swap_seat(&game.id, Side::White, &token, "alice")
            .await
            .unwrap());
        assert!(!repo
            .compare_and_swap_seat(&game.id, Side::White, &token, "bob")
            .await
            .unwrap());

        let stored = repo.get_game(&game.id).await.unwrap().unwrap();
        assert!(stored.white_seat.is_held_by("alice"));
    }

    #[tokio::test]
    async fn test_seat_swap_refuses_second_seat_for_same_identity() {
        let repo = InMemoryGameRepository::new();
        let game = Game::new("owner");
        let white = game.white_seat.open_token().unwrap().to_string();
        let black = game.black_seat.open_token().unwrap().to_string();
        repo.create_game(&game).await.unwrap();

        assert!(repo
            .compare_and_swap_seat(&game.id, Side::White, &white, "alice")
            .await
            .unwrap());
        assert!(!repo
            .compare_and_swap_seat(&game.id, Side::Black, &black, "alice")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_position_swap_requires_expected_position() {
        let repo = InMemoryGameRepository::new();
        let game = Game::new("owner");
        repo.create_game(&game).await.unwrap();
        let now = Utc::now();

        assert!(!repo
            .compare_and_swap_position(&game.id, "stale", "next", now)
            .await
            .unwrap());
        assert!(repo
            .compare_and_swap_position(&game.id, &game.position, "next", now)
            .await
            .unwrap());

        let stored = repo.get_game(&game.id).await.unwrap().unwrap();
        assert_eq!(stored.position, "next");
        assert_eq!(stored.last_move_at, now);
    }

    #[tokio::test]
    async fn test_list_games_most_recent_first() {
        let repo = InMemoryGameRepository::new();
        let mut older = Game::new("owner");
        older.last_move_at = Utc::now() - Duration::minutes(5);
        let newer = Game::new("owner");
        repo.create_game(&older).await.unwrap();
        repo.create_game(&newer).await.unwrap();

        let listed = repo.list_games(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);

        let limited = repo.list_games(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_user_lookup_and_touch() {
        let repo = InMemoryUserRepository::new();
        let user = User::new();
        repo.create_user(&user).await.unwrap();

        let found = repo.get_user_by_external_id(&user.external_id).await.unwrap();
        assert_eq!(found, user);

        let later = user.last_seen_at + Duration::seconds(30);
        repo.touch_last_seen(&user.id, later).await.unwrap();
        let found = repo.get_user_by_external_id(&user.external_id).await.unwrap();
        assert_eq!(found.last_seen_at, later);

        assert!(matches!(
            repo.get_user_by_external_id("missing").await,
            Err(UserRepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.create_user(&user).await,
            Err(UserRepositoryError::AlreadyExists)
        ));
    }
}
