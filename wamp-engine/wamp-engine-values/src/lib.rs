use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// An integer type for WAMP messages.
pub type Integer = u64;

/// A dictionary of key-value pairs.
pub type Dictionary = ahash::HashMap<String, Value>;

/// A sequence of values.
pub type List = Vec<Value>;

/// A value for WAMP messages.
///
/// Non-negative integers always decode as [`Value::Integer`]. Only negative integers decode as
/// [`Value::SignedInteger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(Integer),
    SignedInteger(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Dictionary(Dictionary),
    List(List),
}

impl Value {
    /// Checks if the value is null.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            _ => false,
        }
    }

    /// The value as an [`Integer`].
    pub fn integer(&self) -> Option<Integer> {
        match self {
            Self::Integer(val) => Some(*val),
            _ => None,
        }
    }

    /// The value as a signed integer.
    pub fn signed_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(val) => i64::try_from(*val).ok(),
            Self::SignedInteger(val) => Some(*val),
            _ => None,
        }
    }

    /// The value as a floating point number.
    ///
    /// Integers are converted.
    pub fn float(&self) -> Option<f64> {
        match self {
            Self::Integer(val) => Some(*val as f64),
            Self::SignedInteger(val) => Some(*val as f64),
            Self::Float(val) => Some(*val),
            _ => None,
        }
    }

    /// The value as a [`str`].
    pub fn string(&self) -> Option<&str> {
        match self {
            Self::String(val) => Some(val),
            _ => None,
        }
    }

    /// The value as a [`bool`].
    pub fn bool(&self) -> Option<bool> {
        match self {
            Self::Bool(val) => Some(*val),
            _ => None,
        }
    }

    /// The value as a [`Dictionary`].
    pub fn dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(val) => Some(val),
            _ => None,
        }
    }

    /// The value as a [`Dictionary`].
    pub fn dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Self::Dictionary(val) => Some(val),
            _ => None,
        }
    }

    /// The value as a [`List`].
    pub fn list(&self) -> Option<&List> {
        match self {
            Self::List(val) => Some(val),
            _ => None,
        }
    }

    /// The value as a [`List`].
    pub fn list_mut(&mut self) -> Option<&mut List> {
        match self {
            Self::List(val) => Some(val),
            _ => None,
        }
    }

    /// Checks if the value is "truthy."
    ///
    /// Null, false, zero, and empty strings or containers are not truthy. Every other value is.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Integer(val) => *val != 0,
            Self::SignedInteger(val) => *val != 0,
            Self::Float(val) => *val != 0.0,
            Self::String(val) => !val.is_empty(),
            Self::Bool(val) => *val,
            Self::Dictionary(val) => !val.is_empty(),
            Self::List(val) => !val.is_empty(),
        }
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        match Integer::try_from(value) {
            Ok(value) => Self::Integer(value),
            Err(_) => Self::SignedInteger(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Self::Dictionary(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

/// An error resulting from deserializing a Rust object from a WAMP value using the
/// [`WampDeserialize`] trait.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct WampDeserializeError {
    msg: String,
}

impl WampDeserializeError {
    pub fn new<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self { msg: msg.into() }
    }

    pub fn annotate(&self, msg: String) -> Self {
        Self::new(format!("{}; {msg}", self.msg))
    }
}

/// Trait for deserializing a Rust object from a WAMP value.
pub trait WampDeserialize: Sized {
    /// Deserializes the object from a WAMP value.
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError>;
}

impl WampDeserialize for Value {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        Ok(value)
    }
}

impl WampDeserialize for Integer {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::Integer(val) => Ok(val),
            _ => Err(WampDeserializeError::new("value must be an integer")),
        }
    }
}

impl WampDeserialize for i64 {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        value
            .signed_integer()
            .ok_or_else(|| WampDeserializeError::new("value must be a signed integer"))
    }
}

impl WampDeserialize for f64 {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        value
            .float()
            .ok_or_else(|| WampDeserializeError::new("value must be a number"))
    }
}

impl WampDeserialize for String {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::String(val) => Ok(val),
            _ => Err(WampDeserializeError::new("value must be a string")),
        }
    }
}

impl WampDeserialize for bool {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::Bool(val) => Ok(val),
            _ => Err(WampDeserializeError::new("value must be a bool")),
        }
    }
}

impl WampDeserialize for List {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::List(val) => Ok(val),
            _ => Err(WampDeserializeError::new("value must be a list")),
        }
    }
}

impl WampDeserialize for Dictionary {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::Dictionary(val) => Ok(val),
            _ => Err(WampDeserializeError::new("value must be a dictionary")),
        }
    }
}

impl<T> WampDeserialize for Option<T>
where
    T: WampDeserialize,
{
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        match value {
            Value::Null => Ok(None),
            value => Ok(Some(T::wamp_deserialize(value)?)),
        }
    }
}

#[cfg(test)]
mod value_test {
    use crate::{
        Dictionary,
        List,
        Value,
        WampDeserialize,
    };

    #[test]
    fn deserializes_json_numbers_into_narrowest_variant() {
        assert_matches::assert_matches!(
            serde_json::from_str::<List>("[1, -2, 2.5, null]"),
            Ok(list) => {
                assert_eq!(
                    list,
                    Vec::from_iter([
                        Value::Integer(1),
                        Value::SignedInteger(-2),
                        Value::Float(2.5),
                        Value::Null,
                    ])
                );
            }
        );
    }

    #[test]
    fn deserializes_nested_message_pack_values() {
        let value = Value::List(Vec::from_iter([
            Value::from("a"),
            Value::Dictionary(Dictionary::from_iter([(
                "b".to_owned(),
                Value::Bool(true),
            )])),
        ]));
        let bytes = rmp_serde::to_vec(&value).unwrap();
        assert_matches::assert_matches!(rmp_serde::from_slice::<Value>(&bytes), Ok(decoded) => {
            assert_eq!(decoded, value);
        });
    }

    #[test]
    fn evaluates_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Integer(3).is_truthy());
        assert!(Value::List(Vec::from_iter([Value::Null])).is_truthy());
    }

    #[test]
    fn deserializes_optional_from_null() {
        assert_matches::assert_matches!(Option::<String>::wamp_deserialize(Value::Null), Ok(None));
        assert_matches::assert_matches!(
            Option::<String>::wamp_deserialize(Value::from("x")),
            Ok(Some(val)) => assert_eq!(val, "x")
        );
        assert_matches::assert_matches!(
            Option::<String>::wamp_deserialize(Value::Integer(1)),
            Err(_)
        );
    }
}
