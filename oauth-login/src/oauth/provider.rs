//! Calls to the identity provider's authorization, token and userinfo endpoints.

use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{
    oauth_error, upstream_kind, ConfigErrorKind, Error, ErrorKind, OAuthErrorKind,
    UpstreamErrorKind,
};

use super::state::LoginState;

/// Successful response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for one identity provider tenant.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
}

impl ProviderClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build the URL that sends the browser to the provider's login page.
    pub fn authorization_url(
        config: &ProviderConfig,
        redirect_uri: &str,
        state: &LoginState,
    ) -> Result<String, Error> {
        let url = Url::parse_with_params(
            &config.authorize_url(),
            &[
                ("response_type", "code"),
                ("client_id", config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", config.scope.as_str()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidDomain),
        })?;

        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// `redirect_uri` must be the exact value sent with the authorization
    /// request; providers compare them.
    pub async fn exchange_code(
        &self,
        config: &ProviderConfig,
        redirect_uri: &str,
        code: &str,
    ) -> Result<SecretString, Error> {
        debug!("Exchanging authorization code at {}", config.token_url());

        let response = self
            .client
            .post(config.token_url())
            .basic_auth(&config.client_id, Some(config.client_secret.expose_secret()))
            .form(&[
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| token_endpoint_error(upstream_kind(&e), e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Token endpoint returned {}", status);
            return Err(oauth_error(
                OAuthErrorKind::TokenEndpoint(UpstreamErrorKind::Status(status.as_u16())),
                &format!("token endpoint returned {}", status),
            ));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to read token response: {:?}", e);
            token_endpoint_error(upstream_kind(&e), e)
        })?;

        Ok(SecretString::from(tokens.access_token))
    }

    /// Fetch the signed-in user's profile.
    ///
    /// Any JSON document is accepted; its shape belongs to the provider.
    pub async fn fetch_profile(
        &self,
        config: &ProviderConfig,
        access_token: &SecretString,
    ) -> Result<Value, Error> {
        debug!("Fetching profile from {}", config.userinfo_url());

        let response = self
            .client
            .get(config.userinfo_url())
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|e| userinfo_endpoint_error(upstream_kind(&e), e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Userinfo endpoint returned {}", status);
            return Err(oauth_error(
                OAuthErrorKind::UserInfoEndpoint(UpstreamErrorKind::Status(status.as_u16())),
                &format!("userinfo endpoint returned {}", status),
            ));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to read userinfo response: {:?}", e);
            userinfo_endpoint_error(upstream_kind(&e), e)
        })
    }
}

fn token_endpoint_error(kind: UpstreamErrorKind, err: reqwest::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::TokenEndpoint(kind)),
    }
}

fn userinfo_endpoint_error(kind: UpstreamErrorKind, err: reqwest::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::UserInfoEndpoint(kind)),
    }
}
