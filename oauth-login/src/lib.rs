//! # oauth-login
//!
//! Delegated sign-in through an external identity provider using the OAuth 2.0
//! authorization code flow:
//! - Provider settings validation (`config`)
//! - Login and callback flows with CSRF state checks (`oauth`)
//! - Signed, expiring session cookies (`session`, `signing`)
//! - The `HostContext` seam to the web application running the flows (`host`)
//!
//! ## Architecture
//!
//! Nothing is kept server side between requests. The state token lives in a
//! browser cookie for the length of one login attempt, and the signed-in
//! identity lives in a signed cookie. The host application supplies URLs,
//! signing and user-visible messages, and turns each [`host::FlowResponse`]
//! into an HTTP redirect.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_login::{
//!     http::HttpClientBuilder,
//!     oauth::{Authenticator, ProviderClient},
//! };
//!
//! let provider = ProviderClient::new(HttpClientBuilder::new().build()?);
//! let authenticator = Authenticator::new(settings, provider);
//! let response = authenticator.login(&mut host);
//! ```

pub mod base62;
pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod menu;
pub mod oauth;
pub mod session;
pub mod signing;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
