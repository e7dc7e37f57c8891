use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use lambda_http::tracing::{debug, error};

use crate::{
    error::ApiError,
    middleware::session::{identity_redirect, read_cookie},
    state::AppState,
};
use shared::models::auth::requests::IdentityQuery;
use shared::models::auth::responses::SessionOutcome;

pub const IDENTITY_PATH: &str = "/identity";
pub const DEFAULT_NEXT: &str = "/games";

pub fn routes() -> Router<AppState> {
    Router::new().route(IDENTITY_PATH, get(identity))
}

async fn identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdentityQuery>,
) -> Result<Response, ApiError> {
    let next = safe_next(query.next.as_deref());
    let token = read_cookie(&headers, &state.cookie_name);

    let outcome = state
        .identity_service
        .resolve_or_issue(token.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to resolve identity: {}", e);
            ApiError::from(e)
        })?;

    match outcome {
        SessionOutcome::Resolved(user) => {
            debug!("Identity {} already established", user.external_id);
            Ok(Redirect::to(&next).into_response())
        }
        SessionOutcome::Issued(issued) => Ok(identity_redirect(
            StatusCode::SEE_OTHER,
            &next,
            &state.cookie_name,
            &issued.token,
        )),
    }
}

/// Only local absolute paths outside the identity endpoint are followed.
pub fn safe_next(next: Option<&str>) -> String {
    let Some(next) = next.map(str::trim).filter(|n| !n.is_empty()) else {
        return DEFAULT_NEXT.to_string();
    };

    let path = next.split(['?', '#']).next().unwrap_or_default();
    let is_local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    let loops_back = path.trim_end_matches('/') == IDENTITY_PATH
        || path.starts_with(&format!("{}/", IDENTITY_PATH));

    if is_local && !loops_back {
        next.to_string()
    } else {
        DEFAULT_NEXT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        let cases = [
            (None, "/games"),
            (Some(""), "/games"),
            (Some("/games/abc"), "/games/abc"),
            (Some("/join/p/t?x=1"), "/join/p/t?x=1"),
            (Some("/identity"), "/games"),
            (Some("/identity/"), "/games"),
            (Some("/identity?next=/identity"), "/games"),
            (Some("https://evil.example"), "/games"),
            (Some("//evil.example"), "/games"),
            (Some("/\\evil.example"), "/games"),
            (Some("games"), "/games"),
        ];

        for (input, expected) in cases {
            assert_eq!(safe_next(input), expected, "next = {:?}", input);
        }
    }
}
