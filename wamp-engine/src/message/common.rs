use anyhow::Error;
use wamp_engine_values::{
    Dictionary,
    List,
    Value,
};

use crate::{
    core::{
        error::{
            InteractionError,
            InvocationError,
            error_uri,
        },
        id::Id,
    },
    message::{
        message::{
            AbortMessage,
            ErrorMessage,
            InvocationMessage,
            Message,
        },
        wire::WireMessage,
    },
};

fn message_details(message: &str) -> Dictionary {
    if message.is_empty() {
        return Dictionary::default();
    }
    Dictionary::from_iter([("message".to_owned(), Value::String(message.to_owned()))])
}

pub fn abort_message_for_error(error: &Error) -> Message {
    Message::Abort(AbortMessage {
        details: message_details(&error.to_string()),
        reason: error_uri(error),
        arguments: List::default(),
        arguments_keyword: Dictionary::default(),
    })
}

/// An ABORT message for a failed authentication handshake.
pub fn abort_message_for_authentication_failure(error: &Error) -> AbortMessage {
    let reason = InteractionError::AuthenticationFailed(error.to_string());
    AbortMessage {
        details: message_details(&reason.to_string()),
        reason: reason.uri(),
        arguments: List::default(),
        arguments_keyword: Dictionary::default(),
    }
}

/// An ERROR message correlated to the INVOCATION with the given request ID.
pub fn error_for_invocation(request: Id, error: &InvocationError) -> Message {
    Message::Error(ErrorMessage {
        request_type: InvocationMessage::MESSAGE_TYPE,
        request,
        details: message_details(error.message()),
        error: error.error().clone(),
        arguments: error.arguments().clone(),
        arguments_keyword: error.arguments_keyword().clone(),
    })
}
