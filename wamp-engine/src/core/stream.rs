use std::{
    pin::Pin,
    task,
};

use anyhow::{
    Error,
    Result,
};
use futures_util::{
    Sink,
    SinkExt,
    Stream,
    StreamExt,
};
use log::trace;

use crate::{
    message::message::Message,
    serializer::serializer::{
        Serializer,
        new_serializer,
    },
    transport::{
        connector::Connection,
        transport::{
            Transport,
            TransportData,
        },
    },
};

/// An item flowing through a [`MessageStream`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Ping(Vec<u8>),
    Message(Message),
}

/// A stream of WAMP messages over a transport, serialized with a fixed serializer.
#[derive(Debug)]
pub struct MessageStream {
    transport: Box<dyn Transport>,
    serializer: Box<dyn Serializer>,
}

impl MessageStream {
    pub fn new(transport: Box<dyn Transport>, serializer: Box<dyn Serializer>) -> Self {
        Self {
            transport,
            serializer,
        }
    }

    /// Wraps an established connection, using the serializer it negotiated.
    pub fn from_connection(connection: Connection) -> Self {
        Self::new(
            connection.transport,
            new_serializer(connection.serializer),
        )
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Receives the next WAMP message, answering pings along the way.
    ///
    /// Returns `None` when the transport closes.
    pub async fn next_message(&mut self) -> Result<Option<Message>> {
        while let Some(item) = self.next().await {
            match item? {
                StreamMessage::Ping(data) => {
                    trace!("Answering transport ping of {} bytes", data.len());
                    self.send(StreamMessage::Ping(data)).await?;
                }
                StreamMessage::Message(message) => return Ok(Some(message)),
            }
        }
        Ok(None)
    }

    /// Sends a single WAMP message.
    pub async fn send_message(&mut self, message: Message) -> Result<()> {
        trace!("Sending {} message", message.message_name());
        self.send(StreamMessage::Message(message)).await
    }
}

impl Stream for MessageStream {
    type Item = Result<StreamMessage>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<Option<Self::Item>> {
        let item = match futures_util::ready!(self.transport.poll_next_unpin(cx)) {
            Some(Ok(TransportData::Ping(data))) => Some(Ok(StreamMessage::Ping(data))),
            Some(Ok(TransportData::Message(data))) => Some(
                self.serializer
                    .deserialize(&data)
                    .map(StreamMessage::Message),
            ),
            Some(Err(err)) => Some(Err(err)),
            None => None,
        };
        task::Poll::Ready(item)
    }
}

impl Sink<StreamMessage> for MessageStream {
    type Error = Error;

    fn poll_ready(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        self.transport.poll_ready_unpin(cx)
    }

    fn start_send(
        mut self: Pin<&mut Self>,
        item: StreamMessage,
    ) -> std::result::Result<(), Self::Error> {
        let data = match item {
            StreamMessage::Ping(data) => TransportData::Ping(data),
            StreamMessage::Message(message) => {
                TransportData::Message(self.serializer.serialize(&message)?)
            }
        };
        self.transport.start_send_unpin(data)
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        self.transport.poll_flush_unpin(cx)
    }

    fn poll_close(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        self.transport.poll_close_unpin(cx)
    }
}
