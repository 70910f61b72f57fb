//! First half of the flow: send the browser to the provider.

use log::*;

use super::provider::ProviderClient;
use super::state::{LoginState, STATE_COOKIE, STATE_MAX_AGE_SECS};
use super::{Authenticator, CALLBACK_PATH};
use crate::config;
use crate::error::Error;
use crate::host::{respond_error, FlowResponse, HostContext, ResponseCookie};

impl Authenticator {
    /// Redirect to the provider's authorization endpoint with a fresh state
    /// token, and remember that token in a short-lived cookie.
    pub fn login<H: HostContext>(&self, host: &mut H) -> FlowResponse {
        match self.authorization_redirect(host) {
            Ok(response) => response,
            Err(e) => {
                warn!("Unable to start login: {}", e);
                respond_error(host, &e.to_string())
            }
        }
    }

    fn authorization_redirect<H: HostContext>(&self, host: &H) -> Result<FlowResponse, Error> {
        let config = config::resolve(&self.settings)?;
        let redirect_uri = callback_url(host);
        let state = LoginState::generate();

        let url = ProviderClient::authorization_url(&config, &redirect_uri, &state)?;
        debug!("Redirecting to {} for authorization", config.authorize_url());

        Ok(FlowResponse::redirect(url).with_cookie(ResponseCookie::new(
            STATE_COOKIE,
            state.as_str().to_string(),
            Some(STATE_MAX_AGE_SECS),
        )))
    }
}

/// Absolute URL of the callback endpoint for the current request.
pub(super) fn callback_url<H: HostContext>(host: &H) -> String {
    host.absolute_url(&host.path(CALLBACK_PATH))
}
