//! Error types for the `oauth-login` crate.
//!
//! Follows a root Error struct holding an error kind tree plus an optional
//! source for chaining. The `Display` output of an [`Error`] is the
//! human-readable message shown to the user when a login flow fails, so it
//! never includes the text of the underlying source error.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-login crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-login.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    OAuth(OAuthErrorKind),
    Signing(SigningErrorKind),
    Http(HttpErrorKind),
}

/// Errors from resolving the provider configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    /// Required settings that are absent or empty, in declaration order.
    MissingSettings(Vec<String>),
    /// The domain setting does not form a usable URL.
    InvalidDomain,
}

/// Errors from the authorization code flow.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    InvalidState,
    MissingCode,
    TokenEndpoint(UpstreamErrorKind),
    UserInfoEndpoint(UpstreamErrorKind),
}

/// How a call to the identity provider failed.
#[derive(Debug, PartialEq)]
pub enum UpstreamErrorKind {
    Status(u16),
    Timeout,
    Network,
    InvalidResponse,
}

/// Errors from the signed cookie codec.
#[derive(Debug, PartialEq)]
pub enum SigningErrorKind {
    InvalidKey,
    Serialization,
    Malformed,
    BadSignature,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UpstreamErrorKind::Status(status) => write!(f, "{}", status),
            UpstreamErrorKind::Timeout => write!(f, "request timed out"),
            UpstreamErrorKind::Network => write!(f, "network error"),
            UpstreamErrorKind::InvalidResponse => write!(f, "invalid response from provider"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(ConfigErrorKind::MissingSettings(keys)) => write!(
                f,
                "The following auth0 plugin settings are missing: {}",
                keys.join(", ")
            ),
            ErrorKind::Config(ConfigErrorKind::InvalidDomain) => {
                write!(f, "The auth0 domain setting is not a valid host name")
            }
            ErrorKind::OAuth(kind) => match kind {
                OAuthErrorKind::InvalidState => write!(
                    f,
                    "state check failed, your authentication request is no longer valid"
                ),
                OAuthErrorKind::MissingCode => write!(
                    f,
                    "Could not obtain access token: authorization code missing"
                ),
                OAuthErrorKind::TokenEndpoint(upstream) => {
                    write!(f, "Could not obtain access token: {}", upstream)
                }
                OAuthErrorKind::UserInfoEndpoint(upstream) => {
                    write!(f, "Could not fetch profile: {}", upstream)
                }
            },
            ErrorKind::Signing(kind) => write!(f, "Signing error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(missing: Vec<String>) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Config(ConfigErrorKind::MissingSettings(missing)),
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create signing errors.
pub fn signing_error(kind: SigningErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Signing(kind),
    }
}

/// Classify a transport failure talking to the identity provider.
pub(crate) fn upstream_kind(err: &reqwest::Error) -> UpstreamErrorKind {
    if err.is_timeout() {
        UpstreamErrorKind::Timeout
    } else if err.is_decode() {
        UpstreamErrorKind::InvalidResponse
    } else {
        UpstreamErrorKind::Network
    }
}
