use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_dynamo::{from_item, to_attribute_value, to_item};

#[cfg(test)]
use mockall::automock;

const EXTERNAL_ID_INDEX: &str = "GSI_UserByExternalId";

pub struct DynamoDbUserRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbUserRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError>;
    async fn get_user_by_external_id(&self, external_id: &str)
        -> Result<User, UserRepositoryError>;
    async fn touch_last_seen(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError>;
    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<(), UserRepositoryError>;
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let item = to_item(user).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;
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
                    Err(UserRepositoryError::AlreadyExists)
                } else {
                    Err(UserRepositoryError::DynamoDb(service_error.to_string()))
                }
            }
        }
    }

    async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<User, UserRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(EXTERNAL_ID_INDEX)
            .key_condition_expression("external_id = :external_id")
            .expression_attribute_values(
                ":external_id",
                AttributeValue::S(external_id.to_string()),
            )
            .limit(1)
            .send()
            .await
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;

        match output.items.and_then(|items| items.into_iter().next()) {
            Some(item) => {
                from_item(item).map_err(|e| UserRepositoryError::Serialization(e.to_string()))
            }
            None => Err(UserRepositoryError::NotFound),
        }
    }

    async fn touch_last_seen(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        self.set_attribute(
            user_id,
            "last_seen_at",
            to_attribute_value(at).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?,
        )
        .await
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<(), UserRepositoryError> {
        self.set_attribute(
            user_id,
            "display_name",
            AttributeValue::S(display_name.to_string()),
        )
        .await
    }
}

impl DynamoDbUserRepository {
    async fn set_attribute(
        &self,
        user_id: &str,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<(), UserRepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .update_expression("SET #attr = :value")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", value)
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    Err(UserRepositoryError::NotFound)
                } else {
                    Err(UserRepositoryError::DynamoDb(service_error.to_string()))
                }
            }
        }
    }
}
