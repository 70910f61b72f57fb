use config::Config;
use log::{info, warn};
use oauth_login::http::HttpClientBuilder;
use oauth_login::oauth::{Authenticator, ProviderClient};
use oauth_login::signing::CookieSigner;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Build the login flows from configuration.
///
/// Missing provider settings do not fail here: they are reported to users on
/// each login attempt, naming the settings to add.
pub fn init_authenticator(config: &Config) -> Result<Authenticator, oauth_login::Error> {
    info!(
        "Identity provider client config: upstream_timeout={}s",
        config.upstream_timeout_secs
    );

    let client = HttpClientBuilder::new()
        .with_timeout(config.upstream_timeout())
        .build()?;

    Ok(Authenticator::new(
        config.plugin_config(),
        ProviderClient::new(client),
    ))
}

// Service-level state shared by every request.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub signer: Arc<CookieSigner>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, authenticator: Authenticator) -> Self {
        let secret = app_config.secret().unwrap_or_else(|| {
            warn!("No signing secret configured; generated a random one, sessions will not survive a restart");
            CookieSigner::random_secret()
        });

        Self {
            authenticator: Arc::new(authenticator),
            signer: Arc::new(CookieSigner::new(&secret)),
            config: app_config,
        }
    }

    pub fn signer_ref(&self) -> &CookieSigner {
        self.signer.as_ref()
    }
}
