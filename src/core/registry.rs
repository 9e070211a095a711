//! Provider registry
//!
//! Providers are registered into a [`RegistryBuilder`] during startup. The
//! resulting [`Registry`] is immutable; it can be used directly or installed
//! once as the process-wide registry.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::core::errors::{ErrorKind, Result, TranslateError};
use crate::core::models::{Credentials, ProviderId};
use crate::core::provider::Client;

/// Builds a client from credentials
pub type ClientFactory = fn(&Credentials) -> Result<Arc<dyn Client>>;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Collects provider factories before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    factories: HashMap<ProviderId, ClientFactory>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; an id can only be registered once
    pub fn register(&mut self, id: ProviderId, factory: ClientFactory) -> Result<&mut Self> {
        if self.factories.contains_key(&id) {
            return Err(TranslateError::new(
                ErrorKind::InvalidProvider,
                "register",
                id.as_str(),
                format!("provider {} already registered", id),
            ));
        }

        debug!("Registered provider {}", id);
        self.factories.insert(id, factory);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            factories: self.factories,
        }
    }
}

/// Immutable mapping from provider id to factory
pub struct Registry {
    factories: HashMap<ProviderId, ClientFactory>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build a client for `id`
    pub fn get_client(&self, id: &ProviderId, credentials: &Credentials) -> Result<Arc<dyn Client>> {
        let factory = self.factories.get(id).ok_or_else(|| {
            TranslateError::new(
                ErrorKind::InvalidProvider,
                "get_client",
                id.as_str(),
                format!("unknown provider {}", id),
            )
        })?;

        factory(credentials)
    }

    /// Registered ids, sorted
    pub fn providers(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.factories.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }
}

/// Install the process-wide registry; only the first call succeeds
pub fn install(registry: Registry) -> Result<&'static Registry> {
    let mut fresh = false;
    let installed = GLOBAL.get_or_init(|| {
        fresh = true;
        registry
    });

    if !fresh {
        return Err(TranslateError::new(
            ErrorKind::InvalidProvider,
            "install",
            "registry",
            "provider registry already installed",
        ));
    }

    info!("Installed provider registry with {} providers", installed.factories.len());
    Ok(installed)
}

/// The installed process-wide registry, if any
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// Look up `id` in the process-wide registry
pub fn get_client(id: &ProviderId, credentials: &Credentials) -> Result<Arc<dyn Client>> {
    let registry = global().ok_or_else(|| {
        TranslateError::new(
            ErrorKind::InvalidProvider,
            "get_client",
            id.as_str(),
            "provider registry not installed",
        )
    })?;

    registry.get_client(id, credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Request;

    struct NullClient;

    impl Client for NullClient {
        fn name(&self) -> ProviderId {
            ProviderId::new("null")
        }

        fn version(&self) -> &str {
            "0"
        }

        fn get_cost(&self, _request: &Request) -> f64 {
            0.0
        }

        fn get_char_count(&self, _request: &Request) -> usize {
            0
        }
    }

    fn null_factory(_credentials: &Credentials) -> Result<Arc<dyn Client>> {
        Ok(Arc::new(NullClient))
    }

    #[test]
    fn test_get_client_registered() {
        let mut builder = Registry::builder();
        builder.register(ProviderId::new("null"), null_factory).unwrap();
        let registry = builder.build();

        let client = registry
            .get_client(&ProviderId::new("null"), &Credentials::new("key"))
            .unwrap();
        assert_eq!(client.name().as_str(), "null");
        assert!(client.as_sync().is_none());
        assert!(client.as_async().is_none());
    }

    #[test]
    fn test_get_client_unknown_provider() {
        let registry = Registry::builder().build();
        let err = registry
            .get_client(&ProviderId::new("nope"), &Credentials::new("key"))
            .err()
            .expect("unknown provider must fail");

        assert_eq!(err.kind(), ErrorKind::InvalidProvider);
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = Registry::builder();
        builder.register(ProviderId::new("null"), null_factory).unwrap();
        let err = builder
            .register(ProviderId::new("null"), null_factory)
            .err()
            .expect("duplicate must fail");

        assert_eq!(err.kind(), ErrorKind::InvalidProvider);
        assert_eq!(builder.build().providers(), vec![ProviderId::new("null")]);
    }
}
