use log::warn;
use thiserror::Error;
use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    Value,
};

use crate::{
    core::{
        cancel::CallCancelMode,
        error::InteractionError,
        id::Id,
    },
    message::message::InterruptMessage,
};

/// A request to stop an active invocation.
///
/// Raised as an error from operations that must not continue after cancellation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invocation {request_id} was interrupted ({mode})")]
pub struct Interrupt {
    request_id: Id,
    mode: CallCancelMode,
    reason: Option<Uri>,
    options: Dictionary,
}

impl Interrupt {
    pub fn new(request_id: Id, mode: CallCancelMode) -> Self {
        Self {
            request_id,
            mode,
            reason: None,
            options: Dictionary::default(),
        }
    }

    /// An interrupt synthesized locally when an invocation passes its deadline.
    pub fn timeout(request_id: Id) -> Self {
        Self {
            request_id,
            mode: CallCancelMode::Kill,
            reason: Some(InteractionError::Timeout.uri()),
            options: Dictionary::default(),
        }
    }

    pub fn request_id(&self) -> Id {
        self.request_id
    }

    pub fn mode(&self) -> CallCancelMode {
        self.mode
    }

    /// The error URI reported to the caller if the invocation stops because of this interrupt.
    pub fn reason(&self) -> Uri {
        self.reason
            .clone()
            .unwrap_or_else(|| InteractionError::Canceled.uri())
    }

    pub fn options(&self) -> &Dictionary {
        &self.options
    }
}

impl From<InterruptMessage> for Interrupt {
    fn from(value: InterruptMessage) -> Self {
        let mode = match value.options.get("mode") {
            Some(Value::String(mode)) => CallCancelMode::try_from(mode.as_str())
                .unwrap_or_else(|err| {
                    warn!("Interrupt for invocation {} has {err}", value.invocation_request);
                    CallCancelMode::Kill
                }),
            _ => CallCancelMode::Kill,
        };
        let reason = value
            .options
            .get("reason")
            .and_then(|reason| reason.string())
            .and_then(|reason| Uri::try_from(reason).ok());
        Self {
            request_id: value.invocation_request,
            mode,
            reason,
            options: value.options,
        }
    }
}
