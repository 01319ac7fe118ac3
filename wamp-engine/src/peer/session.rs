use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;
use log::{
    trace,
    warn,
};
use tokio::sync::mpsc::{
    UnboundedReceiver,
    UnboundedSender,
    unbounded_channel,
};

use crate::{
    core::stream::MessageStream,
    message::message::Message,
};

/// The outbound half of a WAMP session.
///
/// Every send is atomic. Concurrent senders are serialized onto the single ordered transport, but
/// their relative order is otherwise unspecified.
#[async_trait]
pub trait Session: Send + Sync {
    /// Sends a message to the router.
    async fn send(&self, message: Message) -> Result<()>;
}

/// A [`Session`] that queues outbound messages on a channel.
///
/// The receiving end is drained onto the transport by [`forward_messages`].
#[derive(Debug, Clone)]
pub struct ChannelSession {
    message_tx: UnboundedSender<Message>,
}

impl ChannelSession {
    pub fn new() -> (Self, UnboundedReceiver<Message>) {
        let (message_tx, message_rx) = unbounded_channel();
        (Self { message_tx }, message_rx)
    }
}

#[async_trait]
impl Session for ChannelSession {
    async fn send(&self, message: Message) -> Result<()> {
        trace!("Queueing {} message", message.message_name());
        self.message_tx
            .send(message)
            .map_err(|_| Error::msg("session is closed"))
    }
}

/// Writes queued messages onto a message stream, one at a time, until every sender is dropped or
/// the stream fails.
pub async fn forward_messages(
    mut message_rx: UnboundedReceiver<Message>,
    stream: &mut MessageStream,
) -> Result<()> {
    while let Some(message) = message_rx.recv().await {
        let name = message.message_name();
        if let Err(err) = stream.send_message(message).await {
            warn!("Failed to send {name} message: {err}");
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod session_test {
    use wamp_engine_uri::Uri;
    use wamp_engine_values::Dictionary;

    use crate::{
        core::stream::MessageStream,
        message::message::{
            GoodbyeMessage,
            Message,
        },
        peer::session::{
            ChannelSession,
            Session,
            forward_messages,
        },
        serializer::serializer::{
            SerializerType,
            new_serializer,
        },
        transport::direct_transport::direct_transport_pair,
    };

    fn goodbye(reason: &str) -> Message {
        Message::Goodbye(GoodbyeMessage {
            details: Dictionary::default(),
            reason: Uri::try_from(reason).unwrap(),
        })
    }

    #[tokio::test]
    async fn forwards_queued_messages_in_order() {
        let (a, b) = direct_transport_pair();
        let mut a = MessageStream::new(Box::new(a), new_serializer(SerializerType::Json));
        let mut b = MessageStream::new(Box::new(b), new_serializer(SerializerType::Json));

        let (session, message_rx) = ChannelSession::new();
        session.send(goodbye("wamp.close.one")).await.unwrap();
        session.send(goodbye("wamp.close.two")).await.unwrap();
        drop(session);

        assert_matches::assert_matches!(forward_messages(message_rx, &mut a).await, Ok(()));
        assert_matches::assert_matches!(b.next_message().await, Ok(Some(message)) => {
            assert_eq!(message, goodbye("wamp.close.one"));
        });
        assert_matches::assert_matches!(b.next_message().await, Ok(Some(message)) => {
            assert_eq!(message, goodbye("wamp.close.two"));
        });
    }

    #[tokio::test]
    async fn fails_to_send_after_receiver_is_dropped() {
        let (session, message_rx) = ChannelSession::new();
        drop(message_rx);
        assert_matches::assert_matches!(session.send(goodbye("wamp.close.normal")).await, Err(_));
    }
}
