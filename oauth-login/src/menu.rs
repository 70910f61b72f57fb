//! Navigation links contributed to the host's menu.

use serde::Serialize;
use serde_json::Value;

use crate::host::HostContext;
use crate::oauth::LOGIN_PATH;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuLink {
    pub href: String,
    pub label: String,
}

/// Offer a sign-in link to anonymous visitors only.
pub fn menu_links<H: HostContext>(host: &H, actor: Option<&Value>) -> Vec<MenuLink> {
    match actor {
        Some(_) => Vec::new(),
        None => vec![MenuLink {
            href: host.path(LOGIN_PATH),
            label: "Sign in with Auth0".to_string(),
        }],
    }
}
