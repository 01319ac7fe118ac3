use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;
use base64::Engine;
use hmac::Mac;
use log::debug;
use wamp_engine_values::{
    Dictionary,
    Value,
};

use crate::{
    auth::auth_method::{
        AuthMethod,
        AuthResponse,
    },
    core::error::NotFoundError,
    message::message::{
        AuthenticateMessage,
        ChallengeMessage,
    },
};

const DEFAULT_ITERATIONS: u32 = 1000;
const MAX_ITERATIONS: u32 = 10_000_000;
const DEFAULT_KEY_LENGTH: u32 = 32;
const MAX_KEY_LENGTH: u32 = 64;

/// Derives a signing key from a secret with PBKDF2-HMAC-SHA256.
///
/// The derived key is returned base64-encoded, which is the form used as the HMAC key.
pub fn derive_key(secret: &str, salt: &str, iterations: u32, key_length: usize) -> String {
    let mut key = vec![0u8; key_length];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(secret.as_bytes(), salt.as_bytes(), iterations, &mut key);
    base64::prelude::BASE64_STANDARD.encode(key)
}

/// Signs a challenge string with HMAC-SHA256, returning the base64-encoded digest.
pub fn sign_challenge(key: &[u8], challenge: &str) -> Result<String> {
    let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(key)?;
    mac.update(challenge.as_bytes());
    Ok(base64::prelude::BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Reads a key derivation parameter from the challenge, which must lie in `1..=max`.
fn extra_u32(extra: &Dictionary, key: &str, default: u32, max: u32) -> Result<u32> {
    match extra.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .integer()
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| (1..=max).contains(value))
            .ok_or_else(|| {
                Error::msg(format!(
                    "challenge {key} must be a positive integer no greater than {max}"
                ))
            }),
    }
}

/// WAMP challenge-response authentication (WAMP-CRA).
///
/// The router sends a challenge string, which is signed with a shared secret. When the router
/// also sends a salt, the signing key is first derived from the secret.
pub struct ChallengeResponseAuth {
    secret: String,
}

impl std::fmt::Debug for ChallengeResponseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeResponseAuth")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ChallengeResponseAuth {
    pub const METHOD_NAME: &'static str = "wampcra";

    pub fn new<S>(secret: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            secret: secret.into(),
        }
    }

    fn signing_key(&self, extra: &Dictionary) -> Result<Vec<u8>> {
        let salt = match extra.get("salt") {
            None | Some(Value::Null) => return Ok(self.secret.as_bytes().to_vec()),
            Some(salt) => salt
                .string()
                .ok_or_else(|| Error::msg("challenge salt must be a string"))?,
        };
        let iterations = extra_u32(extra, "iterations", DEFAULT_ITERATIONS, MAX_ITERATIONS)?;
        let key_length = extra_u32(extra, "keylen", DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH)? as usize;
        debug!("Deriving wampcra key with {iterations} iterations and key length {key_length}");
        Ok(derive_key(&self.secret, salt, iterations, key_length).into_bytes())
    }
}

#[async_trait]
impl AuthMethod for ChallengeResponseAuth {
    fn method_name(&self) -> &'static str {
        Self::METHOD_NAME
    }

    fn requires_auth_id(&self) -> bool {
        true
    }

    async fn authenticate(&self, challenge: &ChallengeMessage) -> Result<AuthResponse> {
        let challenge_string = challenge
            .extra
            .get("challenge")
            .ok_or_else(|| NotFoundError::ChallengeExtra("challenge"))?
            .string()
            .ok_or_else(|| Error::msg("challenge must be a string"))?;
        let key = self.signing_key(&challenge.extra)?;
        Ok(AuthResponse::Authenticate(AuthenticateMessage {
            signature: sign_challenge(&key, challenge_string)?,
            extra: Dictionary::default(),
        }))
    }
}
