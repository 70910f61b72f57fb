//! Per-request implementation of the login flows' host services.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::*;
use oauth_login::host::{FlowResponse, HostContext, MessageLevel};
use oauth_login::signing::CookieSigner;
use serde_json::Value;

use crate::error::Result as WebResult;
use crate::AppState;

/// Cookie holding messages for the next rendered page.
pub(crate) const MESSAGES_COOKIE: &str = "ds_messages";

/// Signing namespace for the messages cookie.
pub(crate) const MESSAGES_NAMESPACE: &str = "messages";

/// Most messages kept pending; older ones are dropped so the cookie stays
/// well under the 4 KB browsers accept.
pub(crate) const MAX_PENDING_MESSAGES: usize = 10;

pub(crate) type Message = (String, MessageLevel);

/// Host services for one request: URLs from the request's origin, the shared
/// cookie signer and a buffer of messages to flash on the next page.
pub(crate) struct RequestHost<'a> {
    origin: String,
    base_path: String,
    secure_cookies: bool,
    signer: &'a CookieSigner,
    messages: Vec<Message>,
}

impl<'a> RequestHost<'a> {
    pub(crate) fn new(app_state: &'a AppState, headers: &HeaderMap) -> Self {
        Self {
            origin: request_origin(headers),
            base_path: app_state.config.base_path(),
            secure_cookies: app_state.config.is_production(),
            signer: app_state.signer_ref(),
            messages: Vec::new(),
        }
    }

    /// Turn a flow outcome into a `302 Found`, attaching its cookies and any
    /// messages queued while the flow ran.
    pub(crate) fn respond(mut self, flow: FlowResponse, jar: CookieJar) -> WebResult<Response> {
        let queued = std::mem::take(&mut self.messages);
        let mut jar = jar;

        for cookie in flow.cookies {
            jar = jar.add(self.cookie(cookie.name, cookie.value, cookie.max_age));
        }

        if !queued.is_empty() {
            let mut pending = read_messages(&jar, self.signer);
            pending.extend(queued);
            if pending.len() > MAX_PENDING_MESSAGES {
                pending.drain(..pending.len() - MAX_PENDING_MESSAGES);
            }
            let token = self.signer.sign(&pending, MESSAGES_NAMESPACE)?;
            jar = jar.add(self.cookie(MESSAGES_COOKIE.to_string(), token, None));
        }

        Ok((StatusCode::FOUND, jar, [(header::LOCATION, flow.location)]).into_response())
    }

    /// Cookie scoped to the application's mount point.
    pub(crate) fn cookie(&self, name: String, value: String, max_age: Option<i64>) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path(self.base_path.clone())
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies);
        if let Some(seconds) = max_age {
            builder = builder.max_age(time::Duration::seconds(seconds));
        }
        builder.build()
    }
}

impl HostContext for RequestHost<'_> {
    fn path(&self, path: &str) -> String {
        if self.base_path == "/" {
            path.to_string()
        } else if path == "/" {
            self.base_path.clone()
        } else {
            format!("{}{}", self.base_path, path)
        }
    }

    fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    fn sign(&self, payload: &Value, namespace: &str) -> Result<String, oauth_login::Error> {
        self.signer.sign(payload, namespace)
    }

    fn add_message(&mut self, message: &str, level: MessageLevel) {
        self.messages.push((message.to_string(), level));
    }
}

/// Messages waiting in the request's messages cookie. A cookie that fails
/// verification is treated as empty.
pub(crate) fn read_messages(jar: &CookieJar, signer: &CookieSigner) -> Vec<Message> {
    jar.get(MESSAGES_COOKIE)
        .and_then(|cookie| match signer.verify(cookie.value(), MESSAGES_NAMESPACE) {
            Ok(messages) => Some(messages),
            Err(e) => {
                debug!("Discarding messages cookie: {}", e);
                None
            }
        })
        .unwrap_or_default()
}

/// Scheme and authority the browser used to reach us, honouring reverse proxy headers.
fn request_origin(headers: &HeaderMap) -> String {
    let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}

fn first_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_origin_defaults_to_plain_localhost() {
        assert_eq!(request_origin(&HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn test_origin_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com:4000"));
        assert_eq!(request_origin(&headers), "http://example.com:4000");
    }

    #[test]
    fn test_origin_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("10.0.0.5:4000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("app.example.com"));
        assert_eq!(request_origin(&headers), "https://app.example.com");
    }

    #[test]
    fn test_read_messages_ignores_forged_cookie() {
        let signer = CookieSigner::new("secret");
        let forged = CookieSigner::new("other")
            .sign(&vec![("hi".to_string(), MessageLevel::Info)], MESSAGES_NAMESPACE)
            .unwrap();
        let jar = CookieJar::new().add(Cookie::new(MESSAGES_COOKIE, forged));

        assert!(read_messages(&jar, &signer).is_empty());
    }
}
