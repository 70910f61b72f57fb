//! Controller for the Auth0 sign-in flow.
//!
//! Both endpoints are reached by browser redirects and always answer with a
//! `302 Found`. Failures are reported to the user as messages on the landing page.

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use log::*;
use oauth_login::oauth::{CallbackParams, STATE_COOKIE};

use crate::error::Result as WebResult;
use crate::host::RequestHost;
use crate::AppState;

/// GET /-/auth0-login
///
/// Starts a login attempt by redirecting to the provider's authorization endpoint.
#[utoipa::path(
    get,
    path = "/-/auth0-login",
    responses(
        (status = 302, description = "Redirect to the provider, or home with an error message when misconfigured"),
        (status = 500, description = "Messages could not be signed"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> WebResult<Response> {
    debug!("Starting Auth0 login");
    let mut host = RequestHost::new(&app_state, &headers);
    let flow = app_state.authenticator.login(&mut host);
    host.respond(flow, jar)
}

/// GET /-/auth0-callback
///
/// Completes a login attempt: checks the state, exchanges the code and signs the user in.
#[utoipa::path(
    get,
    path = "/-/auth0-callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code issued by the provider"),
        ("state" = Option<String>, Query, description = "State token sent with the authorization request"),
    ),
    responses(
        (status = 302, description = "Redirect home, signed in or with an error message"),
        (status = 500, description = "Messages could not be signed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> WebResult<Response> {
    let params = CallbackParams::from_query(query.as_deref());
    let state_cookie = jar.get(STATE_COOKIE).map(|cookie| cookie.value().to_string());
    let mut host = RequestHost::new(&app_state, &headers);
    let flow = app_state
        .authenticator
        .callback(&mut host, &params, state_cookie.as_deref())
        .await;
    host.respond(flow, jar)
}
