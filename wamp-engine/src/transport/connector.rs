use anyhow::Result;
use async_trait::async_trait;

use crate::{
    serializer::serializer::SerializerType,
    transport::{
        config::CommonTransportConfig,
        transport::Transport,
    },
};

/// A connection to a WAMP router produced by a [`Connector`].
#[derive(Debug)]
pub struct Connection {
    pub transport: Box<dyn Transport>,
    pub serializer: SerializerType,
}

/// A type for initiating a connection to a router, registered as the factory for one or more URL
/// schemes.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to the router, returning an open transport.
    async fn connect(&self, config: &CommonTransportConfig) -> Result<Connection>;
}
