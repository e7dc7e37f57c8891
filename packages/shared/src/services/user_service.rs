use std::sync::Arc;

use crate::models::user::{User, DEFAULT_DISPLAY_NAME};
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

pub const MAX_DISPLAY_NAME_LEN: usize = 64;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    /// Blank names reset to the default.
    pub async fn change_display_name(
        &self,
        user: &User,
        display_name: Option<&str>,
    ) -> Result<User, UserServiceError> {
        let display_name = match display_name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_DISPLAY_NAME,
        };

        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(UserServiceError::ValidationError(format!(
                "Display name cannot be longer than {} characters",
                MAX_DISPLAY_NAME_LEN
            )));
        }

        self.repository
            .update_display_name(&user.id, display_name)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => UserServiceError::UserNotFound,
                _ => UserServiceError::RepositoryError(e.to_string()),
            })?;

        let mut updated = user.clone();
        updated.display_name = display_name.to_string();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::in_memory::InMemoryUserRepository;
    use rstest::rstest;

    async fn service_with_user() -> (UserService, InMemoryUserRepository, User) {
        let repo = InMemoryUserRepository::new();
        let user = User::new();
        repo.create_user(&user).await.unwrap();
        (UserService::new(Arc::new(repo.clone())), repo, user)
    }

    #[rstest]
    #[case(Some("Magnus"), "Magnus")]
    #[case(Some("  Judit  "), "Judit")]
    #[case(Some("   "), "Player")]
    #[case(None, "Player")]
    #[tokio::test]
    async fn test_change_display_name(#[case] input: Option<&str>, #[case] expected: &str) {
        let (service, repo, user) = service_with_user().await;

        let updated = service.change_display_name(&user, input).await.unwrap();

        assert_eq!(updated.display_name, expected);
        let stored = repo.get_user_by_external_id(&user.external_id).await.unwrap();
        assert_eq!(stored.display_name, expected);
    }

    #[tokio::test]
    async fn test_change_display_name_too_long() {
        let (service, _, user) = service_with_user().await;
        let long_name = "x".repeat(MAX_DISPLAY_NAME_LEN + 1);

        let result = service.change_display_name(&user, Some(&long_name)).await;

        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_change_display_name_unknown_user() {
        let (service, _, _) = service_with_user().await;

        let result = service.change_display_name(&User::new(), Some("Ghost")).await;

        assert!(matches!(result, Err(UserServiceError::UserNotFound)));
    }
}
