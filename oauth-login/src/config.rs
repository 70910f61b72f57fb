//! Identity provider settings and their validation.

use std::collections::HashMap;

use secrecy::SecretString;

use crate::error::{config_error, Error};

/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Settings that must be present before either flow may run.
pub const REQUIRED_SETTINGS: [&str; 3] = ["domain", "client_id", "client_secret"];

/// Untyped plugin settings as handed over by the host.
pub type PluginConfig = HashMap<String, String>;

/// Validated identity provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider host name, e.g. `example.us.auth0.com`.
    pub domain: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Space separated scopes requested at authorization.
    pub scope: String,
}

impl ProviderConfig {
    /// Base URL for provider endpoints.
    ///
    /// A bare host name is served over https. A domain that already names its
    /// scheme is used as-is, which lets local emulators run on plain http.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("https://") || domain.starts_with("http://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.base_url())
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    pub fn userinfo_url(&self) -> String {
        format!("{}/userinfo", self.base_url())
    }
}

/// Build a [`ProviderConfig`] out of untyped plugin settings.
///
/// Every missing or blank required setting is reported at once so an operator
/// can fix them all in one pass.
pub fn resolve(settings: &PluginConfig) -> Result<ProviderConfig, Error> {
    let missing: Vec<String> = REQUIRED_SETTINGS
        .iter()
        .filter(|key| setting(settings, key).is_none())
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(config_error(missing));
    }

    let required = |key: &str| setting(settings, key).unwrap_or_default().to_string();

    Ok(ProviderConfig {
        domain: required("domain"),
        client_id: required("client_id"),
        client_secret: SecretString::from(required("client_secret")),
        scope: setting(settings, "scope").unwrap_or(DEFAULT_SCOPE).to_string(),
    })
}

/// A setting counts as present only when it is not blank.
fn setting<'a>(settings: &'a PluginConfig, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
