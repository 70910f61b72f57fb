//! Second half of the flow: the provider sends the browser back here.

use chrono::{DateTime, Utc};
use log::*;
use url::form_urlencoded;

use super::login::callback_url;
use super::state::{verify, STATE_COOKIE};
use super::Authenticator;
use crate::config;
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind, SigningErrorKind};
use crate::host::{respond_error, FlowResponse, HostContext, ResponseCookie};
use crate::session::{SessionPayload, ACTOR_NAMESPACE, SESSION_COOKIE};

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Default, PartialEq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackParams {
    /// Read `code` and `state` from a raw query string.
    ///
    /// Never fails: repeated keys keep their first value and anything
    /// unparseable is simply absent, so the flow can report it.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

impl Authenticator {
    /// Validate the callback, trade the code for a profile and sign the user in.
    ///
    /// `state_cookie` is the value of the state cookie sent with the request.
    /// The state cookie is cleared whatever the outcome, so a callback URL
    /// cannot be replayed.
    pub async fn callback<H: HostContext>(
        &self,
        host: &mut H,
        params: &CallbackParams,
        state_cookie: Option<&str>,
    ) -> FlowResponse {
        let response = match self
            .complete(&*host, params, state_cookie, Utc::now())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Login callback failed: {}", e);
                respond_error(host, &e.to_string())
            }
        };

        response.with_cookie(ResponseCookie::removal(STATE_COOKIE))
    }

    async fn complete<H: HostContext>(
        &self,
        host: &H,
        params: &CallbackParams,
        state_cookie: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<FlowResponse, Error> {
        let config = config::resolve(&self.settings)?;

        // Must hold before anything is sent to the provider.
        let returned = params.state.as_deref().unwrap_or_default();
        let expected = state_cookie.unwrap_or_default();
        if !verify(returned, expected) {
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "state parameter does not match the state cookie",
            ));
        }

        let code = params
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                oauth_error(OAuthErrorKind::MissingCode, "callback carried no code")
            })?;

        let redirect_uri = callback_url(host);
        let access_token = self
            .provider
            .exchange_code(&config, &redirect_uri, code)
            .await?;
        let profile = self.provider.fetch_profile(&config, &access_token).await?;

        let payload = serde_json::to_value(SessionPayload::new(profile, now)).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Signing(SigningErrorKind::Serialization),
        })?;
        let token = host.sign(&payload, ACTOR_NAMESPACE)?;

        info!("Signed in user through {}", config.domain);
        Ok(FlowResponse::redirect(host.path("/"))
            .with_cookie(ResponseCookie::new(SESSION_COOKIE, token, None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::host::testing::TestHost;
    use crate::host::MessageLevel;
    use crate::http::HttpClientBuilder;
    use crate::oauth::ProviderClient;
    use crate::session::read_actor;
    use mockito::{Mock, Server, ServerGuard};
    use serde_json::json;

    fn authenticator(domain: &str) -> Authenticator {
        let settings: PluginConfig = [
            ("domain", domain),
            ("client_id", "CLIENT_ID"),
            ("client_secret", "CLIENT_SECRET"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Authenticator::new(
            settings,
            ProviderClient::new(HttpClientBuilder::new().build().unwrap()),
        )
    }

    fn params(state: &str, code: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
        }
    }

    async fn token_mock(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
        server
            .mock("POST", "/oauth/token")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "ACCESS_TOKEN"}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    async fn userinfo_mock(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
        server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer ACCESS_TOKEN")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": "user"}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    fn error_messages(host: &TestHost) -> Vec<String> {
        host.messages
            .iter()
            .filter(|(_, level)| *level == MessageLevel::Error)
            .map(|(message, _)| message.clone())
            .collect()
    }

    #[test]
    fn test_params_from_query_keep_first_value() {
        let parsed = CallbackParams::from_query(Some("state=a&state=b&code=x&code=y&scope=openid"));
        assert_eq!(parsed, params("a", "x"));
    }

    #[test]
    fn test_params_from_missing_or_odd_query() {
        assert_eq!(CallbackParams::from_query(None), CallbackParams::default());
        assert_eq!(
            CallbackParams::from_query(Some("error=access_denied&state=s%20t&&=")),
            CallbackParams {
                code: None,
                state: Some("s t".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_callback_issues_session_cookie() {
        let mut server = Server::new_async().await;
        let token = token_mock(&mut server, 200, 1).await;
        let userinfo = userinfo_mock(&mut server, 200, 1).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert_eq!(response.location, "/");
        let session = response.cookie(SESSION_COOKIE).unwrap();
        assert_eq!(
            read_actor(&host.signer, &session.value, Utc::now()),
            Some(json!({"id": "user"}))
        );
        assert_eq!(response.cookie(STATE_COOKIE).unwrap().max_age, Some(0));
        assert!(host.messages.is_empty());
        token.assert_async().await;
        userinfo.assert_async().await;
    }

    #[tokio::test]
    async fn test_state_mismatch_makes_no_outbound_calls() {
        let mut server = Server::new_async().await;
        let token = token_mock(&mut server, 200, 0).await;
        let userinfo = userinfo_mock(&mut server, 200, 0).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("not-the-same", "x"), Some("state1234"))
            .await;

        assert_eq!(response.location, "/");
        assert!(response.cookie(SESSION_COOKIE).is_none());
        assert_eq!(
            error_messages(&host),
            vec!["state check failed, your authentication request is no longer valid"]
        );
        token.assert_async().await;
        userinfo.assert_async().await;
    }

    #[tokio::test]
    async fn test_replay_without_state_cookie_fails() {
        let mut server = Server::new_async().await;
        let token = token_mock(&mut server, 200, 1).await;
        let _userinfo = userinfo_mock(&mut server, 200, 1).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let first = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;
        assert!(first.cookie(SESSION_COOKIE).is_some());

        // The browser dropped the state cookie when told to.
        let replay = auth.callback(&mut host, &params("state", "x"), None).await;

        assert!(replay.cookie(SESSION_COOKIE).is_none());
        assert_eq!(
            error_messages(&host),
            vec!["state check failed, your authentication request is no longer valid"]
        );
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_failure_skips_userinfo() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server, 500, 1).await;
        let userinfo = userinfo_mock(&mut server, 200, 0).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert_eq!(response.location, "/");
        assert!(response.cookie(SESSION_COOKIE).is_none());
        assert_eq!(
            error_messages(&host),
            vec!["Could not obtain access token: 500"]
        );
        userinfo.assert_async().await;
    }

    #[tokio::test]
    async fn test_userinfo_failure_reports_userinfo_status() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server, 200, 1).await;
        let _userinfo = userinfo_mock(&mut server, 404, 1).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert!(response.cookie(SESSION_COOKIE).is_none());
        assert_eq!(error_messages(&host), vec!["Could not fetch profile: 404"]);
    }

    #[tokio::test]
    async fn test_non_json_profile_is_reported() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server, 200, 1).await;
        let _userinfo = server
            .mock("GET", "/userinfo")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert_eq!(response.location, "/");
        assert!(response.cookie(SESSION_COOKIE).is_none());
        assert_eq!(
            error_messages(&host),
            vec!["Could not fetch profile: invalid response from provider"]
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_reported() {
        let auth = authenticator("http://127.0.0.1:1");
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert_eq!(response.location, "/");
        assert_eq!(response.cookie(STATE_COOKIE).unwrap().max_age, Some(0));
        assert_eq!(
            error_messages(&host),
            vec!["Could not obtain access token: network error"]
        );
    }

    #[tokio::test]
    async fn test_missing_code_is_reported() {
        let mut server = Server::new_async().await;
        let token = token_mock(&mut server, 200, 0).await;
        let auth = authenticator(&server.url());
        let mut host = TestHost::new();

        let params = CallbackParams {
            code: None,
            state: Some("state".to_string()),
        };
        let response = auth.callback(&mut host, &params, Some("state")).await;

        assert_eq!(response.location, "/");
        assert_eq!(
            error_messages(&host),
            vec!["Could not obtain access token: authorization code missing"]
        );
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_callback_with_missing_config() {
        let auth = Authenticator::new(
            PluginConfig::new(),
            ProviderClient::new(HttpClientBuilder::new().build().unwrap()),
        );
        let mut host = TestHost::new();

        let response = auth
            .callback(&mut host, &params("state", "x"), Some("state"))
            .await;

        assert_eq!(response.location, "/");
        assert_eq!(
            error_messages(&host),
            vec!["The following auth0 plugin settings are missing: domain, client_id, client_secret"]
        );
    }
}
