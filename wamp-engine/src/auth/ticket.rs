use anyhow::Result;
use async_trait::async_trait;
use wamp_engine_values::Dictionary;

use crate::{
    auth::auth_method::{
        AuthMethod,
        AuthResponse,
    },
    message::message::{
        AuthenticateMessage,
        ChallengeMessage,
    },
};

/// Ticket-based authentication.
///
/// The pre-configured ticket is sent as-is, regardless of what the challenge contains.
pub struct TicketAuth {
    ticket: String,
}

impl std::fmt::Debug for TicketAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketAuth")
            .field("ticket", &"<redacted>")
            .finish()
    }
}

impl TicketAuth {
    pub const METHOD_NAME: &'static str = "ticket";

    pub fn new<S>(ticket: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            ticket: ticket.into(),
        }
    }
}

#[async_trait]
impl AuthMethod for TicketAuth {
    fn method_name(&self) -> &'static str {
        Self::METHOD_NAME
    }

    fn requires_auth_id(&self) -> bool {
        true
    }

    async fn authenticate(&self, _: &ChallengeMessage) -> Result<AuthResponse> {
        Ok(AuthResponse::Authenticate(AuthenticateMessage {
            signature: self.ticket.clone(),
            extra: Dictionary::default(),
        }))
    }
}
