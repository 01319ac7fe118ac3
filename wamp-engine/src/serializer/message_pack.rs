use anyhow::{
    Error,
    Result,
};
use wamp_engine_values::List;

use crate::{
    core::error::DecodeError,
    message::message::Message,
    serializer::serializer::Serializer,
};

/// A serializer implemented for MessagePack.
#[derive(Debug, Default)]
pub struct MessagePackSerializer {}

impl Serializer for MessagePackSerializer {
    fn serialize(&self, value: &Message) -> Result<Vec<u8>> {
        rmp_serde::to_vec(&value.to_wire_list()).map_err(Error::new)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Message> {
        let list = rmp_serde::from_slice::<List>(bytes)
            .map_err(|err| DecodeError::Malformed(err.to_string()))?;
        Ok(Message::from_wire_list(list)?)
    }
}
