use log::{error, info};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting up [{}] with log level {}",
        config.runtime_env(),
        config.log_level_filter
    );

    let authenticator = match service::init_authenticator(&config) {
        Ok(authenticator) => authenticator,
        Err(e) => {
            error!("Failed to build the identity provider client: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, authenticator);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
