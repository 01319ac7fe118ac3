use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use wamp_engine_values::Dictionary;

use crate::message::message::{
    AbortMessage,
    AuthenticateMessage,
    ChallengeMessage,
    Message,
    WelcomeMessage,
};

/// The next handshake message produced by an [`AuthMethod`] in response to a challenge.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthResponse {
    /// Continue the handshake.
    Authenticate(AuthenticateMessage),
    /// Give up on the handshake.
    Abort(AbortMessage),
}

impl From<AuthResponse> for Message {
    fn from(value: AuthResponse) -> Self {
        match value {
            AuthResponse::Authenticate(message) => Message::Authenticate(message),
            AuthResponse::Abort(message) => Message::Abort(message),
        }
    }
}

/// A client-side authentication method, which answers a router's CHALLENGE.
///
/// Methods are selected only by the method name the router declares in the challenge.
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// The method name announced in HELLO and declared in CHALLENGE.
    fn method_name(&self) -> &'static str;

    /// Whether the method needs an authentication ID to identify the peer.
    fn requires_auth_id(&self) -> bool {
        false
    }

    /// Extra data sent to the router in HELLO.
    fn auth_extra(&self) -> Option<&Dictionary> {
        None
    }

    /// Produces the response to a challenge.
    async fn authenticate(&self, challenge: &ChallengeMessage) -> Result<AuthResponse>;

    /// Verifies the router's WELCOME, for methods that authenticate the router as well.
    async fn check_welcome(&self, welcome: &WelcomeMessage) -> Result<()> {
        let _ = welcome;
        Ok(())
    }
}

impl<'a> Debug for dyn AuthMethod + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMethod")
            .field("method_name", &self.method_name())
            .finish_non_exhaustive()
    }
}
