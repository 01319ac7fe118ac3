use wamp_engine_uri::{
    MatchPolicy,
    Uri,
};
use wamp_engine_values::{
    Dictionary,
    Integer,
    List,
    Value,
};

use crate::{
    core::{
        error::{
            DecodeError,
            NotFoundError,
        },
        id::Id,
    },
    message::wire::{
        WireMessage,
        WireReader,
        WireWriter,
        message_type_of,
        wire_message,
    },
};

wire_message! {
    /// A HELLO message for a peer to initiate a WAMP session in a realm.
    HelloMessage(1, "HELLO") {
        realm: Uri,
    }
    optional {
        details: Dictionary,
    }
}

wire_message! {
    /// A WELCOME message for a router to confirm a peer's WAMP session in a realm.
    WelcomeMessage(2, "WELCOME") {
        session: Id,
    }
    optional {
        details: Dictionary,
    }
}

wire_message! {
    /// An ABORT message for quickly terminating a WAMP session.
    AbortMessage(3, "ABORT") {
        details: Dictionary,
        reason: Uri,
    }
    optional {
        arguments: List,
        arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// A CHALLENGE message for a router to request authentication from a peer.
    ChallengeMessage(4, "CHALLENGE") {
        auth_method: String,
    }
    optional {
        extra: Dictionary,
    }
}

wire_message! {
    /// An AUTHENTICATE message for a peer to respond to a CHALLENGE.
    AuthenticateMessage(5, "AUTHENTICATE") {
        signature: String,
    }
    optional {
        extra: Dictionary,
    }
}

wire_message! {
    /// A GOODBYE message for ending a WAMP session with a two-way handshake.
    GoodbyeMessage(6, "GOODBYE") {
        details: Dictionary,
        reason: Uri,
    }
}

wire_message! {
    /// An ERROR message for communicating an error in response to a single request.
    ErrorMessage(8, "ERROR") {
        request_type: Integer,
        request: Id,
        details: Dictionary,
        error: Uri,
    }
    optional {
        arguments: List,
        arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// A PUBLISH message for publishing an event to a topic.
    PublishMessage(16, "PUBLISH") {
        request: Id,
        options: Dictionary,
        topic: Uri,
    }
    optional {
        arguments: List,
        arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// A PUBLISHED message for confirming an event was published.
    PublishedMessage(17, "PUBLISHED") {
        publish_request: Id,
        publication: Id,
    }
}

/// A SUBSCRIBE message for subscribing to a topic.
///
/// The match policy of the topic is carried in the `match` option on the wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SubscribeMessage {
    pub request: Id,
    pub options: Dictionary,
    pub topic: Uri,
}

impl WireMessage for SubscribeMessage {
    const MESSAGE_TYPE: Integer = 32;
    const MESSAGE_NAME: &'static str = "SUBSCRIBE";

    fn to_wire_list(&self) -> List {
        WireWriter::new(Self::MESSAGE_TYPE)
            .required(&self.request)
            .required(&fold_match_policy(&self.options, &self.topic))
            .required(&self.topic)
            .finish()
    }

    fn from_wire_list(list: List) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(list, Self::MESSAGE_TYPE, Self::MESSAGE_NAME)?;
        let request = reader.required("request")?;
        let options = reader.required("options")?;
        let topic = reader.required::<String>("topic")?;
        reader.finish()?;
        let (options, topic) = unfold_match_policy(Self::MESSAGE_NAME, "topic", options, topic)?;
        Ok(Self {
            request,
            options,
            topic,
        })
    }
}

wire_message! {
    /// A SUBSCRIBED message for confirming a peer has subscribed to a topic.
    SubscribedMessage(33, "SUBSCRIBED") {
        subscribe_request: Id,
        subscription: Id,
    }
}

wire_message! {
    /// An UNSUBSCRIBE message for unsubscribing from a topic.
    UnsubscribeMessage(34, "UNSUBSCRIBE") {
        request: Id,
        subscribed_subscription: Id,
    }
}

wire_message! {
    /// An UNSUBSCRIBED message for confirming a peer has unsubscribed from a topic.
    UnsubscribedMessage(35, "UNSUBSCRIBED") {
        unsubscribe_request: Id,
    }
}

wire_message! {
    /// An EVENT message for relaying a published event to subscribers.
    EventMessage(36, "EVENT") {
        subscribed_subscription: Id,
        published_publication: Id,
        details: Dictionary,
    }
    optional {
        publish_arguments: List,
        publish_arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// A CALL message for invoking a procedure.
    CallMessage(48, "CALL") {
        request: Id,
        options: Dictionary,
        procedure: Uri,
    }
    optional {
        arguments: List,
        arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// A CANCEL message for canceling an active procedure call.
    CancelMessage(49, "CANCEL") {
        call_request: Id,
        options: Dictionary,
    }
}

wire_message! {
    /// A RESULT message for sending the result of a procedure invocation.
    ResultMessage(50, "RESULT") {
        call_request: Id,
        details: Dictionary,
    }
    optional {
        yield_arguments: List,
        yield_arguments_keyword: Dictionary,
    }
}

/// A REGISTER message for registering a procedure in the realm.
///
/// The match policy of the procedure is carried in the `match` option on the wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegisterMessage {
    pub request: Id,
    pub options: Dictionary,
    pub procedure: Uri,
}

impl WireMessage for RegisterMessage {
    const MESSAGE_TYPE: Integer = 64;
    const MESSAGE_NAME: &'static str = "REGISTER";

    fn to_wire_list(&self) -> List {
        WireWriter::new(Self::MESSAGE_TYPE)
            .required(&self.request)
            .required(&fold_match_policy(&self.options, &self.procedure))
            .required(&self.procedure)
            .finish()
    }

    fn from_wire_list(list: List) -> Result<Self, DecodeError> {
        let mut reader = WireReader::new(list, Self::MESSAGE_TYPE, Self::MESSAGE_NAME)?;
        let request = reader.required("request")?;
        let options = reader.required("options")?;
        let procedure = reader.required::<String>("procedure")?;
        reader.finish()?;
        let (options, procedure) =
            unfold_match_policy(Self::MESSAGE_NAME, "procedure", options, procedure)?;
        Ok(Self {
            request,
            options,
            procedure,
        })
    }
}

wire_message! {
    /// A REGISTERED message for confirming a procedure has been registered.
    RegisteredMessage(65, "REGISTERED") {
        register_request: Id,
        registration: Id,
    }
}

wire_message! {
    /// An UNREGISTER message for unregistering a procedure in the realm.
    UnregisterMessage(66, "UNREGISTER") {
        request: Id,
        registered_registration: Id,
    }
}

wire_message! {
    /// An UNREGISTERED message for confirming a procedure has been unregistered.
    UnregisteredMessage(67, "UNREGISTERED") {
        unregister_request: Id,
    }
}

wire_message! {
    /// An INVOCATION message for invoking a procedure on its callee.
    InvocationMessage(68, "INVOCATION") {
        request: Id,
        registered_registration: Id,
        details: Dictionary,
    }
    optional {
        call_arguments: List,
        call_arguments_keyword: Dictionary,
    }
}

wire_message! {
    /// An INTERRUPT message for interrupting an invocation on its callee.
    InterruptMessage(69, "INTERRUPT") {
        invocation_request: Id,
        options: Dictionary,
    }
}

wire_message! {
    /// A YIELD message for yielding the result of an invocation from the callee.
    YieldMessage(70, "YIELD") {
        invocation_request: Id,
        options: Dictionary,
    }
    optional {
        arguments: List,
        arguments_keyword: Dictionary,
    }
}

const MATCH_OPTION: &str = "match";

fn fold_match_policy(options: &Dictionary, uri: &Uri) -> Dictionary {
    let mut options = options.clone();
    if let Some(match_policy) = uri.match_policy() {
        options.insert(MATCH_OPTION.to_owned(), Value::String(match_policy.into()));
    }
    options
}

fn unfold_match_policy(
    message: &'static str,
    field: &'static str,
    mut options: Dictionary,
    uri: String,
) -> Result<(Dictionary, Uri), DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidField {
        message,
        field,
        reason,
    };
    let uri = match options.remove(MATCH_OPTION) {
        Some(Value::String(match_policy)) => {
            let match_policy = MatchPolicy::try_from(match_policy.as_str())
                .map_err(|err| invalid(err.to_string()))?;
            Uri::with_match_policy(uri, match_policy).map_err(|err| invalid(err.to_string()))?
        }
        Some(_) => return Err(invalid("match option must be a string".to_owned())),
        None => Uri::try_from(uri).map_err(|err| invalid(err.to_string()))?,
    };
    Ok((options, uri))
}

type Decoder = fn(List) -> Result<Message, DecodeError>;

fn decode_as<T>(list: List) -> Result<Message, DecodeError>
where
    T: WireMessage + Into<Message>,
{
    T::from_wire_list(list).map(Into::into)
}

macro_rules! messages {
    ($($variant:ident($message:ident)),* $(,)?) => {
        /// A WAMP message.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $($variant($message),)*
        }

        impl Message {
            /// The integer type tag of the message.
            pub fn message_type(&self) -> Integer {
                match self {
                    $(Self::$variant(_) => $message::MESSAGE_TYPE,)*
                }
            }

            /// The message name, mostly for logging.
            pub fn message_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $message::MESSAGE_NAME,)*
                }
            }

            /// Encodes the message to its list form.
            pub fn to_wire_list(&self) -> List {
                match self {
                    $(Self::$variant(message) => message.to_wire_list(),)*
                }
            }
        }

        $(
            impl From<$message> for Message {
                fn from(value: $message) -> Self {
                    Self::$variant(value)
                }
            }
        )*

        /// Decoders for every message type, sorted by type tag.
        static DECODERS: &[(Integer, Decoder)] = &[
            $(($message::MESSAGE_TYPE, decode_as::<$message> as Decoder),)*
        ];
    };
}

messages! {
    Hello(HelloMessage),
    Welcome(WelcomeMessage),
    Abort(AbortMessage),
    Challenge(ChallengeMessage),
    Authenticate(AuthenticateMessage),
    Goodbye(GoodbyeMessage),
    Error(ErrorMessage),
    Publish(PublishMessage),
    Published(PublishedMessage),
    Subscribe(SubscribeMessage),
    Subscribed(SubscribedMessage),
    Unsubscribe(UnsubscribeMessage),
    Unsubscribed(UnsubscribedMessage),
    Event(EventMessage),
    Call(CallMessage),
    Cancel(CancelMessage),
    Result(ResultMessage),
    Register(RegisterMessage),
    Registered(RegisteredMessage),
    Unregister(UnregisterMessage),
    Unregistered(UnregisteredMessage),
    Invocation(InvocationMessage),
    Interrupt(InterruptMessage),
    Yield(YieldMessage),
}

/// Decodes a message in list form by looking up the decoder for its type tag.
///
/// Fails with [`NotFoundError`] if no message type is registered for the tag, or [`DecodeError`]
/// if the message is malformed.
pub fn dispatch_decode(list: List) -> anyhow::Result<Message> {
    let message_type = message_type_of(&list)?;
    let decoder = DECODERS
        .binary_search_by_key(&message_type, |(message_type, _)| *message_type)
        .map(|index| DECODERS[index].1)
        .map_err(|_| NotFoundError::MessageType(message_type))?;
    Ok(decoder(list)?)
}

impl Message {
    /// Decodes a message from its list form.
    ///
    /// Unlike [`dispatch_decode`], every failure is reported as a [`DecodeError`].
    pub fn from_wire_list(list: List) -> Result<Self, DecodeError> {
        let message_type = message_type_of(&list)?;
        match DECODERS.binary_search_by_key(&message_type, |(message_type, _)| *message_type) {
            Ok(index) => (DECODERS[index].1)(list),
            Err(_) => Err(DecodeError::UnknownMessageType(message_type)),
        }
    }

    /// The request ID on the message.
    pub fn request_id(&self) -> Option<Id> {
        match self {
            Self::Error(message) => Some(message.request),
            Self::Publish(message) => Some(message.request),
            Self::Published(message) => Some(message.publish_request),
            Self::Subscribe(message) => Some(message.request),
            Self::Subscribed(message) => Some(message.subscribe_request),
            Self::Unsubscribe(message) => Some(message.request),
            Self::Unsubscribed(message) => Some(message.unsubscribe_request),
            Self::Call(message) => Some(message.request),
            Self::Cancel(message) => Some(message.call_request),
            Self::Result(message) => Some(message.call_request),
            Self::Register(message) => Some(message.request),
            Self::Registered(message) => Some(message.register_request),
            Self::Unregister(message) => Some(message.request),
            Self::Unregistered(message) => Some(message.unregister_request),
            Self::Invocation(message) => Some(message.request),
            Self::Interrupt(message) => Some(message.invocation_request),
            Self::Yield(message) => Some(message.invocation_request),
            _ => None,
        }
    }

    /// The details dictionary on the message.
    pub fn details(&self) -> Option<&Dictionary> {
        match self {
            Self::Hello(message) => Some(&message.details),
            Self::Welcome(message) => Some(&message.details),
            Self::Abort(message) => Some(&message.details),
            Self::Goodbye(message) => Some(&message.details),
            Self::Error(message) => Some(&message.details),
            Self::Event(message) => Some(&message.details),
            Self::Result(message) => Some(&message.details),
            Self::Invocation(message) => Some(&message.details),
            _ => None,
        }
    }

    /// The error reason on the message.
    pub fn reason(&self) -> Option<&Uri> {
        match self {
            Self::Abort(message) => Some(&message.reason),
            Self::Goodbye(message) => Some(&message.reason),
            Self::Error(message) => Some(&message.error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod message_test {
    use wamp_engine_uri::{
        MatchPolicy,
        Uri,
    };
    use wamp_engine_values::{
        Dictionary,
        List,
        Value,
    };

    use crate::{
        core::{
            error::{
                DecodeError,
                NotFoundError,
            },
            id::Id,
        },
        message::{
            message::{
                AbortMessage,
                AuthenticateMessage,
                CallMessage,
                CancelMessage,
                ChallengeMessage,
                DECODERS,
                ErrorMessage,
                EventMessage,
                GoodbyeMessage,
                HelloMessage,
                InterruptMessage,
                InvocationMessage,
                Message,
                PublishMessage,
                PublishedMessage,
                RegisterMessage,
                RegisteredMessage,
                ResultMessage,
                SubscribeMessage,
                SubscribedMessage,
                UnregisterMessage,
                UnregisteredMessage,
                UnsubscribeMessage,
                UnsubscribedMessage,
                WelcomeMessage,
                YieldMessage,
                dispatch_decode,
            },
            wire::WireMessage,
        },
    };

    fn id(value: u64) -> Id {
        Id::try_from(value).unwrap()
    }

    fn uri(value: &str) -> Uri {
        Uri::try_from(value).unwrap()
    }

    fn dict(key: &str, value: Value) -> Dictionary {
        Dictionary::from_iter([(key.to_owned(), value)])
    }

    fn args() -> List {
        List::from_iter([Value::Integer(1), Value::from("two")])
    }

    fn one_of_each() -> Vec<Message> {
        Vec::from_iter([
            Message::Hello(HelloMessage {
                realm: uri("com.myapp.realm"),
                details: dict("agent", Value::from("test")),
            }),
            Message::Welcome(WelcomeMessage {
                session: id(9129137332),
                details: Dictionary::default(),
            }),
            Message::Abort(AbortMessage {
                details: dict("message", Value::from("bye")),
                reason: uri("wamp.error.no_such_realm"),
                arguments: List::default(),
                arguments_keyword: dict("a", Value::Bool(true)),
            }),
            Message::Challenge(ChallengeMessage {
                auth_method: "wampcra".to_owned(),
                extra: dict("challenge", Value::from("abc")),
            }),
            Message::Authenticate(AuthenticateMessage {
                signature: "sig".to_owned(),
                extra: Dictionary::default(),
            }),
            Message::Goodbye(GoodbyeMessage {
                details: Dictionary::default(),
                reason: uri("wamp.close.goodbye_and_out"),
            }),
            Message::Error(ErrorMessage {
                request_type: 68,
                request: id(6131533),
                details: Dictionary::default(),
                error: uri("com.myapp.error.object_write_protected"),
                arguments: args(),
                arguments_keyword: Dictionary::default(),
            }),
            Message::Publish(PublishMessage {
                request: id(239714735),
                options: Dictionary::default(),
                topic: uri("com.myapp.mytopic1"),
                arguments: args(),
                arguments_keyword: dict("color", Value::from("orange")),
            }),
            Message::Published(PublishedMessage {
                publish_request: id(239714735),
                publication: id(4429313566),
            }),
            Message::Subscribe(SubscribeMessage {
                request: id(713845233),
                options: Dictionary::default(),
                topic: Uri::with_match_policy("com.myapp..update", MatchPolicy::Wildcard).unwrap(),
            }),
            Message::Subscribed(SubscribedMessage {
                subscribe_request: id(713845233),
                subscription: id(5512315355),
            }),
            Message::Unsubscribe(UnsubscribeMessage {
                request: id(85346237),
                subscribed_subscription: id(5512315355),
            }),
            Message::Unsubscribed(UnsubscribedMessage {
                unsubscribe_request: id(85346237),
            }),
            Message::Event(EventMessage {
                subscribed_subscription: id(5512315355),
                published_publication: id(4429313566),
                details: Dictionary::default(),
                publish_arguments: args(),
                publish_arguments_keyword: Dictionary::default(),
            }),
            Message::Call(CallMessage {
                request: id(7814135),
                options: dict("receive_progress", Value::Bool(true)),
                procedure: uri("com.myapp.echo"),
                arguments: List::default(),
                arguments_keyword: dict("x", Value::Float(1.5)),
            }),
            Message::Cancel(CancelMessage {
                call_request: id(7814135),
                options: dict("mode", Value::from("kill")),
            }),
            Message::Result(ResultMessage {
                call_request: id(7814135),
                details: Dictionary::default(),
                yield_arguments: args(),
                yield_arguments_keyword: Dictionary::default(),
            }),
            Message::Register(RegisterMessage {
                request: id(25349185),
                options: Dictionary::default(),
                procedure: Uri::with_match_policy("com.myapp", MatchPolicy::Prefix).unwrap(),
            }),
            Message::Registered(RegisteredMessage {
                register_request: id(25349185),
                registration: id(2103333224),
            }),
            Message::Unregister(UnregisterMessage {
                request: id(788923562),
                registered_registration: id(2103333224),
            }),
            Message::Unregistered(UnregisteredMessage {
                unregister_request: id(788923562),
            }),
            Message::Invocation(InvocationMessage {
                request: id(6131533),
                registered_registration: id(9823526),
                details: Dictionary::default(),
                call_arguments: args(),
                call_arguments_keyword: Dictionary::default(),
            }),
            Message::Interrupt(InterruptMessage {
                invocation_request: id(6131533),
                options: dict("mode", Value::from("killnowait")),
            }),
            Message::Yield(YieldMessage {
                invocation_request: id(6131533),
                options: Dictionary::default(),
                arguments: List::default(),
                arguments_keyword: Dictionary::default(),
            }),
        ])
    }

    #[test]
    fn decoder_table_is_sorted_and_complete() {
        assert!(DECODERS.is_sorted_by_key(|(message_type, _)| *message_type));
        assert_eq!(DECODERS.len(), 24);
        assert_eq!(
            DECODERS
                .iter()
                .map(|(message_type, _)| *message_type)
                .collect::<Vec<_>>(),
            Vec::from_iter([
                1, 2, 3, 4, 5, 6, 8, 16, 17, 32, 33, 34, 35, 36, 48, 49, 50, 64, 65, 66, 67, 68, 69,
                70
            ])
        );
    }

    #[test]
    fn every_message_round_trips_through_list_form() {
        for message in one_of_each() {
            let list = message.to_wire_list();
            assert_eq!(list[0], Value::Integer(message.message_type()));
            assert_matches::assert_matches!(Message::from_wire_list(list.clone()), Ok(decoded) => {
                assert_eq!(decoded, message);
            });
            assert_matches::assert_matches!(dispatch_decode(list), Ok(decoded) => {
                assert_eq!(decoded, message);
            });
        }
    }

    #[test]
    fn omits_all_absent_optionals() {
        let message = Message::Yield(YieldMessage {
            invocation_request: id(6131533),
            options: Dictionary::default(),
            arguments: List::default(),
            arguments_keyword: Dictionary::default(),
        });
        assert_eq!(
            message.to_wire_list(),
            List::from_iter([
                Value::Integer(70),
                Value::Integer(6131533),
                Value::Dictionary(Dictionary::default()),
            ])
        );

        let message = Message::Hello(HelloMessage {
            realm: uri("com.myapp.realm"),
            details: Dictionary::default(),
        });
        assert_eq!(
            message.to_wire_list(),
            List::from_iter([Value::Integer(1), Value::from("com.myapp.realm")])
        );
    }

    #[test]
    fn back_fills_arguments_when_only_keyword_arguments_present() {
        let message = CallMessage {
            request: id(7814135),
            options: Dictionary::default(),
            procedure: uri("com.myapp.echo"),
            arguments: List::default(),
            arguments_keyword: dict("x", Value::Integer(1)),
        };
        let list = message.to_wire_list();
        assert_eq!(
            list,
            List::from_iter([
                Value::Integer(48),
                Value::Integer(7814135),
                Value::Dictionary(Dictionary::default()),
                Value::from("com.myapp.echo"),
                Value::List(List::default()),
                Value::Dictionary(dict("x", Value::Integer(1))),
            ])
        );
        assert_matches::assert_matches!(CallMessage::from_wire_list(list), Ok(decoded) => {
            assert_eq!(decoded, message);
        });
    }

    #[test]
    fn folds_match_policy_into_options() {
        let message = SubscribeMessage {
            request: id(1),
            options: Dictionary::default(),
            topic: Uri::with_match_policy("com.myapp..update", MatchPolicy::Wildcard).unwrap(),
        };
        let list = message.to_wire_list();
        assert_eq!(
            list[2],
            Value::Dictionary(dict("match", Value::from("wildcard")))
        );
        assert_matches::assert_matches!(SubscribeMessage::from_wire_list(list), Ok(decoded) => {
            assert_eq!(decoded.topic.match_policy(), Some(MatchPolicy::Wildcard));
            assert!(decoded.options.is_empty());
            assert_eq!(decoded, message);
        });

        let message = RegisterMessage {
            request: id(1),
            options: Dictionary::default(),
            procedure: uri("com.myapp.echo"),
        };
        assert_matches::assert_matches!(
            RegisterMessage::from_wire_list(message.to_wire_list()),
            Ok(decoded) => {
                assert_eq!(decoded.procedure.match_policy(), None);
                assert_eq!(decoded, message);
            }
        );
    }

    #[test]
    fn rejects_invalid_match_policy() {
        let list = List::from_iter([
            Value::Integer(32),
            Value::Integer(1),
            Value::Dictionary(dict("match", Value::from("regex"))),
            Value::from("com.myapp"),
        ]);
        assert_matches::assert_matches!(
            SubscribeMessage::from_wire_list(list),
            Err(DecodeError::InvalidField { field: "topic", .. })
        );
    }

    #[test]
    fn fails_decoding_mismatched_tag() {
        let list = HelloMessage {
            realm: uri("com.myapp.realm"),
            details: Dictionary::default(),
        }
        .to_wire_list();
        assert_matches::assert_matches!(
            WelcomeMessage::from_wire_list(list),
            Err(DecodeError::TagMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn fails_decoding_missing_required_field() {
        let list = List::from_iter([
            Value::Integer(48),
            Value::Integer(1),
            Value::Dictionary(Dictionary::default()),
        ]);
        assert_matches::assert_matches!(
            Message::from_wire_list(list),
            Err(DecodeError::MissingField { message: "CALL", field: "procedure" })
        );
    }

    #[test]
    fn dispatch_fails_with_not_found_for_unknown_tag() {
        let list = List::from_iter([Value::Integer(7), Value::Integer(1)]);
        assert_matches::assert_matches!(dispatch_decode(list.clone()), Err(err) => {
            assert_matches::assert_matches!(
                err.downcast::<NotFoundError>(),
                Ok(NotFoundError::MessageType(7))
            );
        });
        assert_matches::assert_matches!(
            Message::from_wire_list(list),
            Err(DecodeError::UnknownMessageType(7))
        );
    }

    #[test]
    fn dispatch_fails_with_decode_error_for_bad_fields() {
        let list = List::from_iter([Value::Integer(1), Value::Integer(1)]);
        assert_matches::assert_matches!(dispatch_decode(list), Err(err) => {
            assert_matches::assert_matches!(
                err.downcast::<DecodeError>(),
                Ok(DecodeError::InvalidField { field: "realm", .. })
            );
        });
    }

    #[test]
    fn reads_request_id_and_reason() {
        let message = Message::Error(ErrorMessage {
            request_type: 48,
            request: id(12),
            details: Dictionary::default(),
            error: uri("wamp.error.canceled"),
            arguments: List::default(),
            arguments_keyword: Dictionary::default(),
        });
        assert_eq!(message.request_id(), Some(id(12)));
        assert_eq!(message.reason(), Some(&uri("wamp.error.canceled")));
        assert_eq!(message.message_name(), "ERROR");
    }
}
