use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use oauth_login::session::{read_actor, SESSION_COOKIE};
use serde_json::Value;

use crate::AppState;

/// The signed-in actor, if the request carries a valid, unexpired session cookie.
pub(crate) struct CurrentActor(pub Option<Value>);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let actor = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| read_actor(state.signer_ref(), cookie.value(), Utc::now()));

        Ok(CurrentActor(actor))
    }
}
