use std::sync::Arc;

use anyhow::Result;
use url::Url;

use crate::{
    core::error::ConfigurationError,
    serializer::serializer::SerializerType,
};

/// Configuration common to all transports.
#[derive(Debug, Clone)]
pub struct CommonTransportConfig {
    /// The URL of the router.
    ///
    /// The scheme selects the transport factory.
    pub url: Url,
    /// Serializer to use instead of the transport's default.
    pub serializer: Option<SerializerType>,
    /// TLS client configuration.
    ///
    /// Secure schemes use TLS even when this is unset, in which case the transport factory chooses
    /// its own configuration.
    pub tls_config: Option<Arc<rustls::ClientConfig>>,
}

impl CommonTransportConfig {
    /// URL schemes that denote a transport secured by TLS.
    pub const SECURE_SCHEMES: &'static [&'static str] = &["wss", "tcps", "rss"];

    /// Creates a new configuration for the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|err| ConfigurationError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            url,
            serializer: None,
            tls_config: None,
        })
    }

    pub fn with_serializer(mut self, serializer: SerializerType) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn with_tls_config(mut self, tls_config: Arc<rustls::ClientConfig>) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    /// The URL scheme, which is always lowercase.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Checks if the URL scheme denotes a secure transport.
    pub fn is_secure_scheme(&self) -> bool {
        Self::SECURE_SCHEMES.contains(&self.scheme())
    }

    /// Checks if the transport must be secured with TLS.
    pub fn use_tls(&self) -> bool {
        self.is_secure_scheme() || self.tls_config.is_some()
    }

    /// The serializer the transport should use, given its own default.
    pub fn serializer_or(&self, default: SerializerType) -> SerializerType {
        self.serializer.unwrap_or(default)
    }
}
