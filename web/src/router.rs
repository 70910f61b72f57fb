use crate::controller::{auth0_controller, health_check_controller, home_controller};
use crate::AppState;
use axum::{routing::get, Router};
use oauth_login::oauth::{CALLBACK_PATH, LOGIN_PATH};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// To be a part of the rendered OpenAPI document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Auth0 Login"
        ),
        paths(
            auth0_controller::login,
            auth0_controller::callback,
            home_controller::index,
            health_check_controller::health_check,
        ),
        tags(
            (name = "auth0_login", description = "Sign in through Auth0")
        )
    )]
struct ApiDoc;

/// All routes, mounted under the configured base path.
pub fn define_routes(app_state: AppState) -> Router {
    let base_path = app_state.config.base_path();

    let routes = Router::new()
        .merge(auth0_routes(app_state.clone()))
        .merge(home_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"));

    if base_path == "/" {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    }
}

/// The login and callback endpoints, ready to merge into any router sharing [`AppState`].
pub fn auth0_routes(app_state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(auth0_controller::login))
        .route(CALLBACK_PATH, get(auth0_controller::callback))
        .with_state(app_state)
}

fn home_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home_controller::index))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
