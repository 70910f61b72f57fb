//! OAuth 2.0 authorization code flow against a single identity provider.
//!
//! [`Authenticator::login`] starts a flow and [`Authenticator::callback`]
//! completes it. Both are stateless on the server: everything a callback
//! needs arrives with the request.

mod callback;
mod login;
mod provider;
mod state;

pub use callback::CallbackParams;
pub use provider::ProviderClient;
pub use state::{LoginState, STATE_COOKIE, STATE_MAX_AGE_SECS};

use crate::config::PluginConfig;

/// Path that starts a login.
pub const LOGIN_PATH: &str = "/-/auth0-login";

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/-/auth0-callback";

/// Entry point for both halves of the login flow.
///
/// Holds the raw plugin settings rather than a resolved configuration so a
/// misconfiguration is reported to the user on every attempt instead of
/// preventing the host from starting.
#[derive(Clone)]
pub struct Authenticator {
    settings: PluginConfig,
    provider: ProviderClient,
}

impl Authenticator {
    pub fn new(settings: PluginConfig, provider: ProviderClient) -> Self {
        Self { settings, provider }
    }
}
