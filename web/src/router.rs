use crate::{
    controller::{health_check_controller, oauth_controller},
    AppState,
};
use axum::{routing::get, Router};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// OAuth endpoints are reached through browser redirects, so they cannot rely
// on custom request headers.
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/oauth/providers", get(oauth_controller::providers))
        .route(
            "/oauth/{provider}/authorize",
            get(oauth_controller::authorize),
        )
        .route(
            "/oauth/{provider}/callback",
            get(oauth_controller::callback),
        )
        .with_state(app_state)
}
