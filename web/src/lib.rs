//! Axum host for the Auth0 login flows.

use log::*;
use tokio::net::TcpListener;

pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod host;
pub mod router;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{host}");

    let listener = TcpListener::bind(&host).await?;
    axum::serve(listener, router::define_routes(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
pub(crate) mod test_support {
    use clap::Parser;
    use service::config::Config;

    use crate::AppState;

    pub(crate) const TEST_SECRET: &str = "test-secret";

    /// App state configured from command line style arguments, with a fixed signing secret.
    pub(crate) fn app_state(args: &[&str]) -> AppState {
        let mut argv = vec!["auth0_login"];
        argv.extend_from_slice(args);
        let config = Config::parse_from(argv).set_secret(TEST_SECRET.to_string());
        let authenticator =
            service::init_authenticator(&config).expect("authenticator should build");
        AppState::new(config, authenticator)
    }

    /// Every `Set-Cookie` header on a response, parsed.
    pub(crate) fn set_cookies(
        response: &axum::response::Response,
    ) -> Vec<axum_extra::extract::cookie::Cookie<'static>> {
        response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| {
                axum_extra::extract::cookie::Cookie::parse(value.to_string()).ok()
            })
            .collect()
    }
}
