use std::{
    pin::Pin,
    task,
};

use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;
use futures_channel::mpsc::{
    UnboundedReceiver,
    UnboundedSender,
    unbounded,
};
use futures_util::{
    Sink,
    Stream,
    StreamExt,
};
use log::debug;

use crate::{
    serializer::serializer::SerializerType,
    transport::{
        config::CommonTransportConfig,
        connector::{
            Connection,
            Connector,
        },
        transport::{
            Transport,
            TransportData,
        },
    },
};

/// A transport implemented over in-process channels, for connecting two peers in the same
/// process.
#[derive(Debug)]
pub struct DirectTransport {
    data_tx: UnboundedSender<TransportData>,
    data_rx: UnboundedReceiver<TransportData>,
    closed: bool,
}

/// Creates two connected [`DirectTransport`]s.
///
/// Data sent on one end is received on the other.
pub fn direct_transport_pair() -> (DirectTransport, DirectTransport) {
    let (a_to_b_tx, a_to_b_rx) = unbounded();
    let (b_to_a_tx, b_to_a_rx) = unbounded();
    (
        DirectTransport {
            data_tx: a_to_b_tx,
            data_rx: b_to_a_rx,
            closed: false,
        },
        DirectTransport {
            data_tx: b_to_a_tx,
            data_rx: a_to_b_rx,
            closed: false,
        },
    )
}

impl Transport for DirectTransport {
    fn is_open(&self) -> bool {
        !self.closed && !self.data_tx.is_closed()
    }
}

impl Stream for DirectTransport {
    type Item = Result<TransportData>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<Option<Self::Item>> {
        match futures_util::ready!(self.data_rx.poll_next_unpin(cx)) {
            Some(data) => task::Poll::Ready(Some(Ok(data))),
            None => {
                self.closed = true;
                task::Poll::Ready(None)
            }
        }
    }
}

impl Sink<TransportData> for DirectTransport {
    type Error = Error;

    fn poll_ready(
        self: Pin<&mut Self>,
        _: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        if self.is_open() {
            task::Poll::Ready(Ok(()))
        } else {
            task::Poll::Ready(Err(Error::msg("direct transport is closed")))
        }
    }

    fn start_send(
        self: Pin<&mut Self>,
        item: TransportData,
    ) -> std::result::Result<(), Self::Error> {
        self.data_tx.unbounded_send(item).map_err(|err| {
            Error::msg(format!(
                "failed to send on direct transport: {}",
                err.into_send_error()
            ))
        })
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn poll_close(
        mut self: Pin<&mut Self>,
        _: &mut task::Context<'_>,
    ) -> task::Poll<std::result::Result<(), Self::Error>> {
        self.data_tx.close_channel();
        self.closed = true;
        task::Poll::Ready(Ok(()))
    }
}

/// A [`Connector`] that connects over a [`DirectTransport`].
///
/// The far end of every connection is handed to the receiver returned from
/// [`DirectConnector::new`], which plays the role of the router.
#[derive(Debug)]
pub struct DirectConnector {
    accept_tx: UnboundedSender<DirectTransport>,
}

impl DirectConnector {
    pub fn new() -> (Self, UnboundedReceiver<DirectTransport>) {
        let (accept_tx, accept_rx) = unbounded();
        (Self { accept_tx }, accept_rx)
    }
}

#[async_trait]
impl Connector for DirectConnector {
    async fn connect(&self, config: &CommonTransportConfig) -> Result<Connection> {
        let (local, remote) = direct_transport_pair();
        self.accept_tx
            .unbounded_send(remote)
            .map_err(|_| Error::msg("direct connection acceptor is gone"))?;
        debug!("Established direct connection for {}", config.url);
        Ok(Connection {
            transport: Box::new(local),
            serializer: config.serializer_or(SerializerType::Json),
        })
    }
}
