use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use lambda_http::tracing::{debug, error};

use crate::{error::ApiError, state::AppState};
use shared::models::auth::responses::SessionOutcome;
use shared::models::user::User;

/// The caller's identity, bound by [`session`] before any handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::MissingSession)
    }
}

/// Resolve the identity cookie. Callers without a usable identity get a fresh
/// one and are sent back to the same URI; the handler does not run.
pub async fn session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = read_cookie(req.headers(), &state.cookie_name);

    match state
        .identity_service
        .resolve_or_issue(token.as_deref())
        .await
    {
        Ok(SessionOutcome::Resolved(user)) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Ok(SessionOutcome::Issued(issued)) => {
            let location = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            debug!(
                "Issued identity {} to anonymous caller of {}",
                issued.user.external_id, location
            );
            identity_redirect(
                StatusCode::TEMPORARY_REDIRECT,
                &location,
                &state.cookie_name,
                &issued.token,
            )
        }
        Err(e) => {
            error!("Failed to establish session: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Redirect that also stores `token` in the identity cookie.
pub fn identity_redirect(
    status: StatusCode,
    location: &str,
    cookie_name: &str,
    token: &str,
) -> Response {
    (
        status,
        [
            (LOCATION, location.to_string()),
            (SET_COOKIE, identity_cookie(cookie_name, token)),
        ],
    )
        .into_response()
}

pub fn identity_cookie(cookie_name: &str, token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/",
        cookie_name, token
    )
}

/// Value of the first `name` cookie across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
