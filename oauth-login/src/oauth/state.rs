//! CSRF state tokens for the authorization code flow.
//!
//! Nothing is stored server side: the token travels once through the
//! provider as the `state` query parameter and once as a browser cookie, and a
//! callback is valid only when both copies agree.

use rand::Rng;

/// Name of the cookie carrying the state token between login and callback.
pub const STATE_COOKIE: &str = "auth0-state";

/// Lifetime of the state cookie in seconds.
pub const STATE_MAX_AGE_SECS: i64 = 3600;

/// Number of random bytes in a state token (128 bits).
const STATE_BYTES: usize = 16;

/// Anti-CSRF nonce minted for a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginState(String);

impl LoginState {
    /// Generate a cryptographically random state token.
    pub fn generate() -> Self {
        let random_bytes: [u8; STATE_BYTES] = rand::thread_rng().gen();
        Self(hex::encode(random_bytes))
    }

    /// Get the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check the `state` returned by the provider against the state cookie.
///
/// Both values must be non-empty and byte-for-byte equal. The comparison runs
/// in time independent of where the values first differ.
pub fn verify(returned: &str, expected: &str) -> bool {
    if returned.is_empty() || expected.is_empty() {
        return false;
    }
    constant_time_eq(returned.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    let mut diff = 0_u8;
    for (a, b) in left.iter().zip(right.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let state = LoginState::generate();
        assert_eq!(state.as_str().len(), 32); // 16 bytes hex encoded
        assert!(state.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_states_differ() {
        let first = LoginState::generate();
        let second = LoginState::generate();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_matching_state() {
        let state = LoginState::generate();
        assert!(verify(state.as_str(), state.as_str()));
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        assert!(!verify("not-the-same", "state1234"));
        assert!(!verify("state1234", "state1235"));
    }

    #[test]
    fn test_verify_rejects_empty_values() {
        assert!(!verify("", ""));
        assert!(!verify("state", ""));
        assert!(!verify("", "state"));
    }
}
