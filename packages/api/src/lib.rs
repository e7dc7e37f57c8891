use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

/// Full router. Everything except `/health` and `/identity` sits behind the
/// session layer.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let with_session = Router::new()
        .merge(routes::user::routes())
        .merge(routes::games::routes())
        .merge(routes::join::routes())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::session::session,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::identity::routes())
        .merge(with_session)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
