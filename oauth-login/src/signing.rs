//! HMAC-SHA256 signed cookie codec.
//!
//! Tokens have the form `base64url(json) "." base64url(mac)`. The MAC covers
//! the namespace as well as the payload, so a value signed for one purpose
//! (say `"messages"`) is rejected when presented as another (`"actor"`).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;

use crate::error::{signing_error, Error, ErrorKind, SigningErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies cookie payloads with a host-wide secret.
pub struct CookieSigner {
    secret: SecretString,
}

impl CookieSigner {
    /// Create a signer from the host secret.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: SecretString::from(secret.to_string()),
        }
    }

    /// Generate a random secret for hosts that were not given one.
    pub fn random_secret() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }

    /// Serialize `payload` to JSON and sign it under `namespace`.
    pub fn sign<T: Serialize + ?Sized>(&self, payload: &T, namespace: &str) -> Result<String, Error> {
        let json = serde_json::to_vec(payload).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Signing(SigningErrorKind::Serialization),
        })?;
        let encoded = URL_SAFE_NO_PAD.encode(json);

        let mac = self.mac(namespace, &encoded)?;
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", encoded, signature))
    }

    /// Check the signature on `token` and decode its payload.
    pub fn verify<T: DeserializeOwned>(&self, token: &str, namespace: &str) -> Result<T, Error> {
        let (encoded, signature) = token.rsplit_once('.').ok_or_else(|| {
            signing_error(SigningErrorKind::Malformed, "Token has no signature")
        })?;

        let expected_sig = URL_SAFE_NO_PAD.decode(signature).map_err(|_| {
            signing_error(SigningErrorKind::Malformed, "Invalid signature encoding")
        })?;

        self.mac(namespace, encoded)?
            .verify_slice(&expected_sig)
            .map_err(|_| signing_error(SigningErrorKind::BadSignature, "Signature mismatch"))?;

        let json = URL_SAFE_NO_PAD.decode(encoded).map_err(|_| {
            signing_error(SigningErrorKind::Malformed, "Invalid payload encoding")
        })?;

        serde_json::from_slice(&json).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Signing(SigningErrorKind::Malformed),
        })
    }

    fn mac(&self, namespace: &str, encoded: &str) -> Result<HmacSha256, Error> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| signing_error(SigningErrorKind::InvalidKey, "Invalid HMAC key"))?;
        mac.update(namespace.as_bytes());
        mac.update(b".");
        mac.update(encoded.as_bytes());
        Ok(mac)
    }
}
