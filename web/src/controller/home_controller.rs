//! Landing page showing who is signed in and any pending messages.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use oauth_login::menu::{menu_links, MenuLink};
use serde::Serialize;
use serde_json::Value;

use crate::extractors::current_actor::CurrentActor;
use crate::host::{read_messages, RequestHost, MESSAGES_COOKIE};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub actor: Option<Value>,
    pub messages: Vec<PageMessage>,
    pub menu_links: Vec<MenuLink>,
}

#[derive(Debug, Serialize)]
pub struct PageMessage {
    pub message: String,
    pub level: String,
}

/// GET the landing page
///
/// Pending messages are shown once: the messages cookie is cleared.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Signed-in actor, pending messages and menu links"),
    )
)]
pub async fn index(
    CurrentActor(actor): CurrentActor,
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> impl IntoResponse {
    let host = RequestHost::new(&app_state, &headers);

    let messages = read_messages(&jar, app_state.signer_ref())
        .into_iter()
        .map(|(message, level)| PageMessage {
            message,
            level: level.to_string(),
        })
        .collect::<Vec<_>>();

    let jar = if jar.get(MESSAGES_COOKIE).is_some() {
        jar.add(host.cookie(MESSAGES_COOKIE.to_string(), String::new(), Some(0)))
    } else {
        jar
    };

    let page = HomePage {
        menu_links: menu_links(&host, actor.as_ref()),
        actor,
        messages,
    };

    (jar, Json(page))
}
