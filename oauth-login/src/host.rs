//! The seam between the login flows and the web application hosting them.
//!
//! Flows never touch the HTTP framework directly. They ask the host for URLs,
//! signatures and user-visible messages through [`HostContext`], and describe
//! their answer as a [`FlowResponse`] that the host turns into a real response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Error;

/// Severity of a message queued for the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl From<MessageLevel> for u8 {
    fn from(level: MessageLevel) -> Self {
        match level {
            MessageLevel::Info => 1,
            MessageLevel::Warning => 2,
            MessageLevel::Error => 3,
        }
    }
}

impl TryFrom<u8> for MessageLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(MessageLevel::Info),
            2 => Ok(MessageLevel::Warning),
            3 => Ok(MessageLevel::Error),
            other => Err(format!("unknown message level {}", other)),
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MessageLevel::Info => write!(f, "info"),
            MessageLevel::Warning => write!(f, "warning"),
            MessageLevel::Error => write!(f, "error"),
        }
    }
}

/// Services the host application provides to a single request.
pub trait HostContext {
    /// Prefix an application path with the host's mount point.
    fn path(&self, path: &str) -> String;

    /// Turn an already prefixed path into an absolute URL using the origin of
    /// the current request.
    fn absolute_url(&self, path: &str) -> String;

    /// Sign `payload` under `namespace` with the host's cookie codec.
    fn sign(&self, payload: &Value, namespace: &str) -> Result<String, Error>;

    /// Queue a message for the next page the user sees.
    fn add_message(&mut self, message: &str, level: MessageLevel);
}

/// A cookie the host must set (or clear) on the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    /// `None` leaves persistence to the browser, `Some(0)` removes the cookie.
    pub max_age: Option<i64>,
}

impl ResponseCookie {
    pub fn new(name: &str, value: String, max_age: Option<i64>) -> Self {
        Self {
            name: name.to_string(),
            value,
            max_age,
        }
    }

    /// Cookie instruction that deletes `name` from the browser.
    pub fn removal(name: &str) -> Self {
        Self::new(name, String::new(), Some(0))
    }
}

/// Outcome of a flow: a `302 Found` redirect plus cookies to attach.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowResponse {
    pub location: String,
    pub cookies: Vec<ResponseCookie>,
}

impl FlowResponse {
    pub fn redirect(location: String) -> Self {
        Self {
            location,
            cookies: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: ResponseCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Look up a cookie set by this response.
    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

/// Surface `message` as an error and send the browser back to the application root.
pub fn respond_error<H: HostContext>(host: &mut H, message: &str) -> FlowResponse {
    host.add_message(message, MessageLevel::Error);
    FlowResponse::redirect(host.path("/"))
}

/// In-memory host used by the crate's own tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::signing::CookieSigner;

    pub(crate) struct TestHost {
        pub origin: String,
        pub signer: CookieSigner,
        pub messages: Vec<(String, MessageLevel)>,
    }

    impl TestHost {
        pub fn new() -> Self {
            Self {
                origin: "http://localhost".to_string(),
                signer: CookieSigner::new("test-secret"),
                messages: Vec::new(),
            }
        }
    }

    impl HostContext for TestHost {
        fn path(&self, path: &str) -> String {
            path.to_string()
        }

        fn absolute_url(&self, path: &str) -> String {
            format!("{}{}", self.origin, path)
        }

        fn sign(&self, payload: &Value, namespace: &str) -> Result<String, Error> {
            self.signer.sign(payload, namespace)
        }

        fn add_message(&mut self, message: &str, level: MessageLevel) {
            self.messages.push((message.to_string(), level));
        }
    }
}
