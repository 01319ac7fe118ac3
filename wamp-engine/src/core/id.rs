use std::fmt::Display;

use thiserror::Error;
use wamp_engine_values::{
    Integer,
    Value,
    WampDeserialize,
    WampDeserializeError,
};

/// An integer ID, used for identification of resources and requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Id(u64);

impl Id {
    /// The minimum allowable value of an ID.
    pub const MIN: Id = Id(1);

    /// The maximum allowable value of an ID.
    pub const MAX: Id = Id(1 << 53);

    /// The raw integer value.
    pub fn value(&self) -> Integer {
        self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Id::MIN
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Error for an ID being out of range.
#[derive(Debug, Error)]
#[error("{value} is out of range for IDs")]
pub struct IdOutOfRange {
    value: u64,
}

impl IdOutOfRange {
    fn new(value: u64) -> Self {
        Self { value }
    }
}

impl TryFrom<u64> for Id {
    type Error = IdOutOfRange;
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value < Self::MIN.0 || value > Self::MAX.0 {
            Err(IdOutOfRange::new(value))
        } else {
            Ok(Id(value))
        }
    }
}

impl From<Id> for Value {
    fn from(value: Id) -> Self {
        Value::Integer(value.0)
    }
}

impl WampDeserialize for Id {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        Id::try_from(Integer::wamp_deserialize(value)?)
            .map_err(|err| WampDeserializeError::new(err.to_string()))
    }
}

#[cfg(test)]
mod id_test {
    use wamp_engine_values::{
        Value,
        WampDeserialize,
    };

    use crate::core::id::Id;

    #[test]
    fn rejects_out_of_range_ids() {
        assert_matches::assert_matches!(Id::try_from(0), Err(err) => {
            assert!(err.to_string().contains("out of range"));
        });
        assert_matches::assert_matches!(Id::try_from((1 << 53) + 1), Err(_));
        assert_matches::assert_matches!(Id::try_from(1 << 53), Ok(id) => assert_eq!(id, Id::MAX));
    }

    #[test]
    fn deserializes_from_integer_value() {
        assert_matches::assert_matches!(Id::wamp_deserialize(Value::Integer(25)), Ok(id) => {
            assert_eq!(id.value(), 25);
        });
        assert_matches::assert_matches!(Id::wamp_deserialize(Value::Integer(0)), Err(_));
        assert_matches::assert_matches!(Id::wamp_deserialize(Value::from("25")), Err(_));
    }
}
