use anyhow::Error;
use thiserror::Error;
use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    Integer,
    List,
    Value,
};

use crate::{
    core::id::Id,
    peer::interrupt::Interrupt,
};

/// A basic error that occurs while processing a WAMP message.
#[derive(Debug, Error)]
pub enum BasicError {
    /// A generic resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// An invalid argument was passed.
    #[error("{0}")]
    InvalidArgument(String),
    /// The operation is not allowed based on process configuration.
    #[error("{0}")]
    NotAllowed(String),
    /// Some internal error occurred.
    ///
    /// Should only be used when there is no other error variant that describes the error, since
    /// the message is very vague and not very useful for debugging.
    #[error("{0}")]
    Internal(String),
}

impl BasicError {
    /// The trailing URI component for the error.
    pub fn uri_component(&self) -> &str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotAllowed(_) => "not_allowed",
            Self::Internal(_) => "internal",
        }
    }
}

/// An interaction error that occurs while processing a WAMP message.
///
/// Interaction errors are clearly defined in the WAMP standard and are reserved for errors that
/// peers must be able to parse easily.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// The incoming message violates the WAMP protocol.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// The call was canceled.
    #[error("canceled")]
    Canceled,
    /// The call timed out.
    #[error("timeout")]
    Timeout,
    /// The peer failed to authenticate.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl InteractionError {
    /// The trailing URI component for the error.
    pub fn uri_component(&self) -> &str {
        match self {
            Self::ProtocolViolation(_) => "protocol_violation",
            Self::Canceled => "canceled",
            Self::Timeout => "timeout",
            Self::AuthenticationFailed(_) => "authentication_failed",
        }
    }

    /// The error URI.
    pub fn uri(&self) -> Uri {
        Uri::from_known(format!("wamp.error.{}", self.uri_component()))
    }
}

/// An error resulting from decoding a WAMP message.
///
/// Terminal for the frame being decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes or list could not be read as a WAMP message at all.
    #[error("malformed message: {0}")]
    Malformed(String),
    /// The message type tag does not match the type being decoded.
    #[error("expected message type {expected}, got {actual}")]
    TagMismatch { expected: Integer, actual: Integer },
    /// A required field is absent.
    #[error("{message} is missing required field {field}")]
    MissingField {
        message: &'static str,
        field: &'static str,
    },
    /// A field has the wrong type or an invalid value.
    #[error("invalid {field} in {message}: {reason}")]
    InvalidField {
        message: &'static str,
        field: &'static str,
        reason: String,
    },
    /// The message has more elements than it declares.
    #[error("{message} has {count} unexpected trailing fields")]
    TrailingFields { message: &'static str, count: usize },
    /// The message type tag is not a known WAMP message.
    #[error("unknown message type {0}")]
    UnknownMessageType(Integer),
}

/// An error resulting from invalid configuration at setup time.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("auth method {0} is configured more than once")]
    DuplicateAuthMethod(String),
    #[error("auth method {0} requires an auth id, but none was given")]
    MissingAuthId(String),
    #[error("auth methods disagree on the value of auth extra key {0}")]
    ConflictingAuthExtra(String),
    #[error("transport scheme {0} is already registered")]
    DuplicateTransportScheme(String),
    #[error("transport registry is sealed")]
    TransportRegistrySealed,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// An error resulting from an operation being invalid in the current state.
#[derive(Debug, Error)]
pub enum InvalidStateError {
    #[error("invocation {0} is already done")]
    InvocationDone(Id),
    #[error("invocation {0} did not request progressive results")]
    ProgressNotRequested(Id),
}

/// An error resulting from a lookup of some resource that does not exist.
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("no decoder is registered for message type {0}")]
    MessageType(Integer),
    #[error("no transport factory is registered for scheme {0}")]
    TransportScheme(String),
    #[error("auth method {0} is not in the keyring")]
    AuthMethod(String),
    #[error("challenge is missing {0}")]
    ChallengeExtra(&'static str),
}

/// An application-facing error for a procedure invocation.
///
/// Converted into an ERROR message for the invocation at the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}: {message}")]
pub struct InvocationError {
    error: Uri,
    message: String,
    arguments: List,
    arguments_keyword: Dictionary,
}

impl InvocationError {
    /// Error URI for an invalid or missing call argument.
    pub const INVALID_ARGUMENT: &'static str = "wamp.error.invalid_argument";

    /// Creates a new error with the given error URI and human-readable message.
    pub fn new<S>(error: Uri, message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            error,
            message: message.into(),
            arguments: List::default(),
            arguments_keyword: Dictionary::default(),
        }
    }

    /// Creates a new error for an invalid or missing argument.
    ///
    /// The offending key or index is reported under the `key` keyword argument.
    pub fn invalid_argument<S, K>(message: S, key: K) -> Self
    where
        S: Into<String>,
        K: Into<Value>,
    {
        Self::new(Uri::from_known(Self::INVALID_ARGUMENT), message)
            .with_arguments_keyword(Dictionary::from_iter([("key".to_owned(), key.into())]))
    }

    /// Attaches positional arguments to the error.
    pub fn with_arguments(mut self, arguments: List) -> Self {
        self.arguments = arguments;
        self
    }

    /// Attaches keyword arguments to the error.
    pub fn with_arguments_keyword(mut self, arguments_keyword: Dictionary) -> Self {
        self.arguments_keyword = arguments_keyword;
        self
    }

    /// The error URI, which serves as the machine-readable error code.
    pub fn error(&self) -> &Uri {
        &self.error
    }

    /// The human-readable error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn arguments(&self) -> &List {
        &self.arguments
    }

    pub fn arguments_keyword(&self) -> &Dictionary {
        &self.arguments_keyword
    }

    /// Converts any error into an invocation error.
    ///
    /// Invocation errors are preserved as-is. Other errors are mapped to their standard URI.
    pub fn from_error(error: &Error) -> Self {
        match error.downcast_ref::<InvocationError>() {
            Some(error) => error.clone(),
            None => Self::new(error_uri(error), error.to_string()),
        }
    }
}

/// Determines the error URI that should be reported for an error.
pub fn error_uri(error: &Error) -> Uri {
    if let Some(error) = error.downcast_ref::<InvocationError>() {
        return error.error().clone();
    }
    if let Some(interrupt) = error.downcast_ref::<Interrupt>() {
        return interrupt.reason();
    }
    let component = if let Some(error) = error.downcast_ref::<InteractionError>() {
        error.uri_component()
    } else if let Some(error) = error.downcast_ref::<BasicError>() {
        error.uri_component()
    } else if error.downcast_ref::<DecodeError>().is_some() {
        "protocol_violation"
    } else if error.downcast_ref::<NotFoundError>().is_some() {
        "not_found"
    } else if error.downcast_ref::<ConfigurationError>().is_some() {
        "not_allowed"
    } else {
        "internal"
    };
    Uri::from_known(format!("wamp.error.{component}"))
}
