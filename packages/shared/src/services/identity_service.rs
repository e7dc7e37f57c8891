use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::auth::responses::{IdentityClaims, IssuedIdentity, SessionOutcome};
use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::identity_service_errors::IdentityServiceError;

/// Mints and verifies the anonymous identity tokens handed to browsers.
pub struct IdentityService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    jwt_secret: String,
    max_age: Option<Duration>,
}

impl IdentityService {
    pub fn new(user_repository: Arc<dyn UserRepository + Send + Sync>, jwt_secret: String) -> Self {
        IdentityService {
            user_repository,
            jwt_secret,
            max_age: None,
        }
    }

    /// Reject tokens issued longer ago than `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Resolve a raw token to its user and refresh the user's `last_seen_at`.
    pub async fn resolve(&self, raw_token: Option<&str>) -> Result<User, IdentityServiceError> {
        let token = raw_token
            .filter(|t| !t.is_empty())
            .ok_or(IdentityServiceError::InvalidToken)?;
        let claims = self.verify_token(token)?;

        let mut user = self
            .user_repository
            .get_user_by_external_id(&claims.sub)
            .await
            .map_err(map_repository_error)?;

        let now = Utc::now();
        self.user_repository
            .touch_last_seen(&user.id, now)
            .await
            .map_err(map_repository_error)?;
        user.last_seen_at = now;

        Ok(user)
    }

    /// Create a brand new user and a token bound to it.
    pub async fn issue(&self) -> Result<IssuedIdentity, IdentityServiceError> {
        let user = User::new();
        self.user_repository
            .create_user(&user)
            .await
            .map_err(|e| IdentityServiceError::RepositoryUnavailable(e.to_string()))?;

        let token = self.sign(&user.external_id, Utc::now())?;
        info!(external_id = %user.external_id, "Issued new identity");

        Ok(IssuedIdentity { user, token })
    }

    pub async fn resolve_or_issue(
        &self,
        raw_token: Option<&str>,
    ) -> Result<SessionOutcome, IdentityServiceError> {
        match self.resolve(raw_token).await {
            Ok(user) => Ok(SessionOutcome::Resolved(user)),
            Err(IdentityServiceError::InvalidToken) => {
                debug!("No valid identity presented, issuing a new one");
                Ok(SessionOutcome::Issued(self.issue().await?))
            }
            Err(err) => Err(err),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<IdentityClaims, IdentityServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let mut validation = Validation::new(Algorithm::HS256);
        // Identity tokens carry no `exp`; age is checked against `iat` instead.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let claims = decode::<IdentityClaims>(token, &decoding_key, &validation)
            .map_err(|err| {
                debug!(error = %err, "Rejected identity token");
                IdentityServiceError::InvalidToken
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(IdentityServiceError::InvalidToken);
        }

        // An age reaching past the representable range puts no lower bound.
        let oldest = self
            .max_age
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age));
        if let Some(oldest) = oldest {
            if (claims.iat as i64) < oldest.timestamp() {
                debug!(external_id = %claims.sub, "Identity token too old");
                return Err(IdentityServiceError::InvalidToken);
            }
        }

        Ok(claims)
    }

    fn sign(
        &self,
        external_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, IdentityServiceError> {
        let claims = IdentityClaims {
            sub: external_id.to_string(),
            iat: issued_at.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| IdentityServiceError::JwtError(format!("{:#?}", e)))
    }
}

fn map_repository_error(err: UserRepositoryError) -> IdentityServiceError {
    match err {
        UserRepositoryError::NotFound => IdentityServiceError::InvalidToken,
        other => IdentityServiceError::RepositoryUnavailable(other.to_string()),
    }
}
