use std::sync::{
    Arc,
    LazyLock,
    RwLock,
    atomic::{
        AtomicBool,
        Ordering,
    },
};

use anyhow::{
    Error,
    Result,
};
use log::{
    debug,
    info,
};

use crate::{
    core::{
        error::{
            ConfigurationError,
            NotFoundError,
        },
        hash::HashMap,
    },
    transport::{
        config::CommonTransportConfig,
        connector::{
            Connection,
            Connector,
        },
    },
};

/// A registry of transport factories, keyed by URL scheme.
///
/// Registration is expected to happen during setup. Once the registry is sealed, it becomes
/// read-only.
#[derive(Default)]
pub struct TransportRegistry {
    factories: RwLock<HashMap<String, Arc<dyn Connector>>>,
    sealed: AtomicBool,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport factory for one or more schemes.
    ///
    /// Schemes are lowercased. Either every scheme is registered or none are. A scheme may only
    /// appear once per call, even when `overwrite` is set.
    pub fn register_transport_factory<I, S>(
        &self,
        schemes: I,
        factory: Arc<dyn Connector>,
        overwrite: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.is_sealed() {
            return Err(ConfigurationError::TransportRegistrySealed.into());
        }
        let mut lowercased = Vec::<String>::new();
        for scheme in schemes {
            let scheme = scheme.as_ref().to_lowercase();
            if lowercased.contains(&scheme) {
                return Err(ConfigurationError::DuplicateTransportScheme(scheme).into());
            }
            lowercased.push(scheme);
        }
        let schemes = lowercased;
        let mut factories = self
            .factories
            .write()
            .map_err(|_| Error::msg("transport registry lock is poisoned"))?;
        // Sealing takes the write lock, so this check cannot race with it.
        if self.is_sealed() {
            return Err(ConfigurationError::TransportRegistrySealed.into());
        }
        if !overwrite {
            if let Some(scheme) = schemes
                .iter()
                .find(|scheme| factories.contains_key(scheme.as_str()))
            {
                return Err(ConfigurationError::DuplicateTransportScheme(scheme.clone()).into());
            }
        }
        for scheme in schemes {
            debug!("Registered transport factory for scheme {scheme}");
            factories.insert(scheme, factory.clone());
        }
        Ok(())
    }

    /// Seals the registry, rejecting all future registrations.
    ///
    /// A registration already holding the lock completes before the seal takes effect.
    pub fn seal(&self) {
        let _factories = self.factories.write();
        self.sealed.store(true, Ordering::Release);
        debug!("Sealed transport registry");
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// The registered schemes, in sorted order.
    pub fn schemes(&self) -> Result<Vec<String>> {
        let factories = self
            .factories
            .read()
            .map_err(|_| Error::msg("transport registry lock is poisoned"))?;
        let mut schemes = factories.keys().cloned().collect::<Vec<_>>();
        schemes.sort();
        Ok(schemes)
    }

    /// Connects a transport for the given configuration, using the factory registered for its
    /// URL scheme.
    pub async fn connect_transport(&self, config: &CommonTransportConfig) -> Result<Connection> {
        let scheme = config.scheme().to_lowercase();
        let factory = self
            .factories
            .read()
            .map_err(|_| Error::msg("transport registry lock is poisoned"))?
            .get(&scheme)
            .cloned()
            .ok_or_else(|| NotFoundError::TransportScheme(scheme.clone()))?;
        info!("Connecting to {} over {scheme} transport", config.url);
        factory.connect(config).await
    }
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("schemes", &self.schemes().unwrap_or_default())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

static GLOBAL_TRANSPORT_REGISTRY: LazyLock<TransportRegistry> =
    LazyLock::new(TransportRegistry::new);

/// The process-wide transport registry.
pub fn global_transport_registry() -> &'static TransportRegistry {
    &GLOBAL_TRANSPORT_REGISTRY
}
