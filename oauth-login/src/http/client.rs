//! Provider HTTP client builder.

use std::time::Duration;

/// Settings for the provider client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Upper bound for each call to the provider, connect included.
    pub timeout: Duration,
    /// Sent on every provider call.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            user_agent: format!("oauth-login/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for the client that talks to the token and userinfo endpoints.
///
/// No retry middleware is installed: an authorization code is single use, so
/// a failed exchange is reported rather than replayed.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Builder with a 5 second timeout and this crate's user agent.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Bound each provider call, connection setup included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bound_provider_calls() {
        let builder = HttpClientBuilder::new();
        assert_eq!(builder.config.timeout, Duration::from_secs(5));
        assert!(builder.config.user_agent.starts_with("oauth-login/"));
    }

    #[test]
    fn test_timeout_is_configurable() {
        let builder = HttpClientBuilder::new().with_timeout(Duration::from_secs(2));
        assert_eq!(builder.config.timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_rustls_client_builds() {
        assert!(HttpClientBuilder::new()
            .with_timeout(Duration::from_millis(250))
            .build()
            .is_ok());
    }
}
