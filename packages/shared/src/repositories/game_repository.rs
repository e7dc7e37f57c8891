use crate::models::game::{Game, Seat, Side};
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_dynamo::{from_item, to_attribute_value, to_item};
use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

const PRIVATE_ID_INDEX: &str = "GSI_GameByPrivateId";

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

/// Durable storage for games.
///
/// The two `compare_and_swap_*` operations are the only way a stored game
/// changes after creation. Each must check and write in one atomic step and
/// report `false` when the expectation no longer holds.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError>;

    async fn get_game_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Option<Game>, GameRepositoryError>;

    /// Moves `side` from `Unclaimed(expected_token)` to `Claimed(external_id)`.
    /// Refuses when the opposite seat is already held by `external_id`.
    async fn compare_and_swap_seat(
        &self,
        game_id: &str,
        side: Side,
        expected_token: &str,
        external_id: &str,
    ) -> Result<bool, GameRepositoryError>;

    async fn compare_and_swap_position(
        &self,
        game_id: &str,
        expected_position: &str,
        new_position: &str,
        moved_at: DateTime<Utc>,
    ) -> Result<bool, GameRepositoryError>;

    /// Most recently played games first.
    async fn list_games(&self, limit: usize) -> Result<Vec<Game>, GameRepositoryError>;
}

fn seat_attribute(side: Side) -> &'static str {
    match side {
        Side::White => "white_seat",
        Side::Black => "black_seat",
    }
}

/// Sorts by last activity, newest first, and keeps `limit` games.
pub(crate) fn most_recent_first(mut games: Vec<Game>, limit: usize) -> Vec<Game> {
    games.sort_by(|a, b| {
        b.last_move_at
            .cmp(&a.last_move_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    games.truncate(limit);
    games
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item =
            to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    Err(GameRepositoryError::AlreadyExists)
                } else {
                    Err(GameRepositoryError::DynamoDb(service_error.to_string()))
                }
            }
        }
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            let game: Game = from_item(item)
                .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            Ok(Some(game))
        } else {
            Ok(None)
        }
    }

    async fn get_game_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Option<Game>, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(PRIVATE_ID_INDEX)
            .key_condition_expression("private_id = :private_id")
            .expression_attribute_values(":private_id", AttributeValue::S(private_id.to_string()))
            .limit(1)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        match output.items.and_then(|items| items.into_iter().next()) {
            Some(item) => {
                // The index is eventually consistent; re-read the base item.
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                self.get_game(&game.id).await
            }
            None => Ok(None),
        }
    }

    async fn compare_and_swap_seat(
        &self,
        game_id: &str,
        side: Side,
        expected_token: &str,
        external_id: &str,
    ) -> Result<bool, GameRepositoryError> {
        let claimed = Seat::Claimed {
            external_id: external_id.to_string(),
            consumed_token: expected_token.to_string(),
        };
        let claimed = to_attribute_value(&claimed)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(game_id.to_string()))
            .update_expression("SET #seat = :claimed")
            .condition_expression(
                "#seat.#state = :unclaimed AND #seat.#token = :token \
                 AND (attribute_not_exists(#other.#holder) OR #other.#holder <> :claimant)",
            )
            .expression_attribute_names("#seat", seat_attribute(side))
            .expression_attribute_names("#other", seat_attribute(side.opponent()))
            .expression_attribute_names("#state", "state")
            .expression_attribute_names("#token", "token")
            .expression_attribute_names("#holder", "external_id")
            .expression_attribute_values(":claimed", claimed)
            .expression_attribute_values(":unclaimed", AttributeValue::S("unclaimed".to_string()))
            .expression_attribute_values(":token", AttributeValue::S(expected_token.to_string()))
            .expression_attribute_values(":claimant", AttributeValue::S(external_id.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(GameRepositoryError::DynamoDb(service_error.to_string()))
                }
            }
        }
    }

    async fn compare_and_swap_position(
        &self,
        game_id: &str,
        expected_position: &str,
        new_position: &str,
        moved_at: DateTime<Utc>,
    ) -> Result<bool, GameRepositoryError> {
        let moved_at = to_attribute_value(moved_at)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(game_id.to_string()))
            .update_expression("SET #position = :new, #last_move_at = :moved_at")
            .condition_expression("#position = :expected")
            .expression_attribute_names("#position", "position")
            .expression_attribute_names("#last_move_at", "last_move_at")
            .expression_attribute_values(":new", AttributeValue::S(new_position.to_string()))
            .expression_attribute_values(
                ":expected",
                AttributeValue::S(expected_position.to_string()),
            )
            .expression_attribute_values(":moved_at", moved_at)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    Ok(false)
                } else {
                    Err(GameRepositoryError::DynamoDb(service_error.to_string()))
                }
            }
        }
    }

    async fn list_games(&self, limit: usize) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

            for item in output.items.unwrap_or_default() {
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                games.push(game);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(most_recent_first(games, limit))
    }
}
