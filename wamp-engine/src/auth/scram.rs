use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use rand::Rng;
use wamp_engine_values::{
    Dictionary,
    List,
    Value,
};

use crate::{
    auth::{
        auth_method::{
            AuthMethod,
            AuthResponse,
        },
        channel_binding::ChannelBinding,
    },
    core::error::InteractionError,
    message::message::{
        AbortMessage,
        ChallengeMessage,
    },
};

fn generate_nonce() -> String {
    (0..16)
        .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// WAMP Salted Challenge Response Authentication Mechanism.
///
/// Only the HELLO portion is supported: the client nonce and channel binding are announced, but
/// any challenge is answered by aborting the handshake.
#[derive(Debug)]
pub struct ScramAuth {
    auth_extra: Dictionary,
}

impl ScramAuth {
    pub const METHOD_NAME: &'static str = "wamp-scram";

    pub fn new(channel_binding: Option<ChannelBinding>) -> Self {
        Self {
            auth_extra: Dictionary::from_iter([
                ("nonce".to_owned(), Value::String(generate_nonce())),
                ("channel_binding".to_owned(), Value::from(channel_binding)),
            ]),
        }
    }

    /// The client nonce announced in HELLO.
    pub fn nonce(&self) -> &str {
        self.auth_extra
            .get("nonce")
            .and_then(|nonce| nonce.string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuthMethod for ScramAuth {
    fn method_name(&self) -> &'static str {
        Self::METHOD_NAME
    }

    fn requires_auth_id(&self) -> bool {
        true
    }

    fn auth_extra(&self) -> Option<&Dictionary> {
        Some(&self.auth_extra)
    }

    async fn authenticate(&self, _: &ChallengeMessage) -> Result<AuthResponse> {
        warn!("Aborting handshake because wamp-scram is not supported");
        let reason = InteractionError::AuthenticationFailed(format!(
            "{} is not supported",
            Self::METHOD_NAME
        ));
        Ok(AuthResponse::Abort(AbortMessage {
            details: Dictionary::from_iter([(
                "message".to_owned(),
                Value::String(reason.to_string()),
            )]),
            reason: reason.uri(),
            arguments: List::default(),
            arguments_keyword: Dictionary::default(),
        }))
    }
}
