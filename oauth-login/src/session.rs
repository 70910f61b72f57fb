//! Session cookie payload carrying the signed-in actor.

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base62;
use crate::signing::CookieSigner;

/// Cookie holding the signed actor.
pub const SESSION_COOKIE: &str = "ds_actor";

/// Signing namespace for the session cookie.
pub const ACTOR_NAMESPACE: &str = "actor";

/// How long an issued session stays valid.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Signed contents of the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Profile returned by the provider's userinfo endpoint.
    pub a: Value,
    /// Expiry as base-62 encoded unix seconds.
    pub e: String,
}

impl SessionPayload {
    /// Payload for `profile`, valid for [`SESSION_TTL_SECS`] from `now`.
    pub fn new(profile: Value, now: DateTime<Utc>) -> Self {
        let expires_at = (now.timestamp() + SESSION_TTL_SECS).max(0) as u64;
        Self {
            a: profile,
            e: base62::encode(expires_at),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        base62::decode(&self.e)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|at| at <= now).unwrap_or(true)
    }
}

/// Recover the actor from a session cookie value.
///
/// Returns `None` when the signature does not verify or the session expired.
pub fn read_actor(signer: &CookieSigner, token: &str, now: DateTime<Utc>) -> Option<Value> {
    let payload: SessionPayload = match signer.verify(token, ACTOR_NAMESPACE) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("Ignoring session cookie: {}", e);
            return None;
        }
    };

    if payload.is_expired(now) {
        debug!("Ignoring expired session cookie");
        return None;
    }

    Some(payload.a)
}
