use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    Integer,
    List,
    Value,
};

use crate::core::{
    error::DecodeError,
    id::Id,
};

/// A single positional field of a WAMP message.
pub trait WireField: Sized {
    /// Encodes the field to a value.
    fn to_wire(&self) -> Value;

    /// Decodes the field from a value.
    fn from_wire(value: Value) -> Result<Self, String>;

    /// Checks if the field holds its empty default, which may be omitted when trailing.
    fn is_wire_empty(&self) -> bool {
        false
    }
}

impl WireField for Id {
    fn to_wire(&self) -> Value {
        Value::Integer(self.value())
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        let value = value
            .integer()
            .ok_or_else(|| "expected an id".to_owned())?;
        Id::try_from(value).map_err(|err| err.to_string())
    }
}

impl WireField for Integer {
    fn to_wire(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        value
            .integer()
            .ok_or_else(|| "expected an integer".to_owned())
    }
}

impl WireField for String {
    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        match value {
            Value::String(value) => Ok(value),
            _ => Err("expected a string".to_owned()),
        }
    }

    fn is_wire_empty(&self) -> bool {
        self.is_empty()
    }
}

impl WireField for Uri {
    fn to_wire(&self) -> Value {
        Value::String(self.as_ref().to_owned())
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        match value {
            Value::String(value) => Uri::try_from(value).map_err(|err| err.to_string()),
            _ => Err("expected a uri string".to_owned()),
        }
    }
}

impl WireField for Dictionary {
    fn to_wire(&self) -> Value {
        Value::Dictionary(self.clone())
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        match value {
            Value::Dictionary(value) => Ok(value),
            _ => Err("expected a dictionary".to_owned()),
        }
    }

    fn is_wire_empty(&self) -> bool {
        self.is_empty()
    }
}

impl WireField for List {
    fn to_wire(&self) -> Value {
        Value::List(self.clone())
    }

    fn from_wire(value: Value) -> Result<Self, String> {
        match value {
            Value::List(value) => Ok(value),
            _ => Err("expected a list".to_owned()),
        }
    }

    fn is_wire_empty(&self) -> bool {
        self.is_empty()
    }
}

/// A WAMP message that can be converted to and from its canonical list form:
/// `[message_type, required..., optional...]`.
pub trait WireMessage: Sized {
    /// The integer type tag.
    const MESSAGE_TYPE: Integer;

    /// The message name, mostly for logging.
    const MESSAGE_NAME: &'static str;

    /// Encodes the message to its list form.
    fn to_wire_list(&self) -> List;

    /// Decodes the message from its list form.
    fn from_wire_list(list: List) -> Result<Self, DecodeError>;
}

/// Builds the list form of a message.
///
/// Optional fields are emitted up to and including the last non-empty one. Empty optional fields
/// before that point are emitted as their empty value.
#[derive(Debug)]
pub struct WireWriter {
    list: List,
    optional: Vec<(Value, bool)>,
}

impl WireWriter {
    pub fn new(message_type: Integer) -> Self {
        Self {
            list: List::from_iter([Value::Integer(message_type)]),
            optional: Vec::new(),
        }
    }

    pub fn required<T>(mut self, field: &T) -> Self
    where
        T: WireField,
    {
        self.list.push(field.to_wire());
        self
    }

    pub fn optional<T>(mut self, field: &T) -> Self
    where
        T: WireField,
    {
        self.optional.push((field.to_wire(), field.is_wire_empty()));
        self
    }

    pub fn finish(mut self) -> List {
        let present = self
            .optional
            .iter()
            .rposition(|(_, empty)| !empty)
            .map(|last| last + 1)
            .unwrap_or(0);
        self.list.extend(
            self.optional
                .into_iter()
                .take(present)
                .map(|(value, _)| value),
        );
        self.list
    }
}

/// Reads the type tag of a message in list form.
pub fn message_type_of(list: &List) -> Result<Integer, DecodeError> {
    match list.first() {
        Some(Value::Integer(message_type)) => Ok(*message_type),
        Some(_) => Err(DecodeError::Malformed(
            "message type must be an integer".to_owned(),
        )),
        None => Err(DecodeError::Malformed("message is empty".to_owned())),
    }
}

/// Reads the fields of a message in list form, in declaration order.
#[derive(Debug)]
pub struct WireReader {
    message: &'static str,
    values: std::vec::IntoIter<Value>,
}

impl WireReader {
    /// Starts reading a message, validating its type tag.
    pub fn new(
        list: List,
        message_type: Integer,
        message: &'static str,
    ) -> Result<Self, DecodeError> {
        let actual = message_type_of(&list)?;
        if actual != message_type {
            return Err(DecodeError::TagMismatch {
                expected: message_type,
                actual,
            });
        }
        let mut values = list.into_iter();
        values.next();
        Ok(Self { message, values })
    }

    pub fn required<T>(&mut self, field: &'static str) -> Result<T, DecodeError>
    where
        T: WireField,
    {
        match self.values.next() {
            Some(value) => self.decode(field, value),
            None => Err(DecodeError::MissingField {
                message: self.message,
                field,
            }),
        }
    }

    pub fn optional<T>(&mut self, field: &'static str) -> Result<T, DecodeError>
    where
        T: WireField + Default,
    {
        match self.values.next() {
            Some(value) => self.decode(field, value),
            None => Ok(T::default()),
        }
    }

    /// Finishes reading, failing if any elements remain.
    pub fn finish(self) -> Result<(), DecodeError> {
        let count = self.values.len();
        if count > 0 {
            return Err(DecodeError::TrailingFields {
                message: self.message,
                count,
            });
        }
        Ok(())
    }

    fn decode<T>(&self, field: &'static str, value: Value) -> Result<T, DecodeError>
    where
        T: WireField,
    {
        T::from_wire(value).map_err(|reason| DecodeError::InvalidField {
            message: self.message,
            field,
            reason,
        })
    }
}

/// Declares a message struct whose list form is its required fields followed by its optional
/// fields.
macro_rules! wire_message {
    (
        $(#[$meta:meta])*
        $name:ident($message_type:literal, $message_name:literal) {
            $(
                $(#[$required_meta:meta])*
                $required:ident: $required_ty:ty
            ),* $(,)?
        }
        $(
            optional {
                $(
                    $(#[$optional_meta:meta])*
                    $optional:ident: $optional_ty:ty
                ),* $(,)?
            }
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$required_meta])*
                pub $required: $required_ty,
            )*
            $($(
                $(#[$optional_meta])*
                pub $optional: $optional_ty,
            )*)?
        }

        impl $crate::message::wire::WireMessage for $name {
            const MESSAGE_TYPE: wamp_engine_values::Integer = $message_type;
            const MESSAGE_NAME: &'static str = $message_name;

            fn to_wire_list(&self) -> wamp_engine_values::List {
                $crate::message::wire::WireWriter::new(Self::MESSAGE_TYPE)
                    $(.required(&self.$required))*
                    $($(.optional(&self.$optional))*)?
                    .finish()
            }

            fn from_wire_list(
                list: wamp_engine_values::List,
            ) -> Result<Self, $crate::core::error::DecodeError> {
                let mut reader = $crate::message::wire::WireReader::new(
                    list,
                    Self::MESSAGE_TYPE,
                    Self::MESSAGE_NAME,
                )?;
                let message = Self {
                    $($required: reader.required(stringify!($required))?,)*
                    $($($optional: reader.optional(stringify!($optional))?,)*)?
                };
                reader.finish()?;
                Ok(message)
            }
        }
    };
}

pub(crate) use wire_message;
