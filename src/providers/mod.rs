//! Built-in provider implementations

pub mod deepl;

use crate::core::errors::Result;
use crate::core::models::ProviderId;
use crate::core::registry::Registry;

/// Registry with every built-in provider registered
pub fn builtin_registry() -> Result<Registry> {
    let mut builder = Registry::builder();
    builder.register(ProviderId::DEEPL, deepl::factory)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Credentials;

    #[test]
    fn test_builtin_registry_has_deepl() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.providers(), vec![ProviderId::DEEPL]);

        let client = registry
            .get_client(&ProviderId::DEEPL, &Credentials::new("key:fx"))
            .unwrap();
        assert_eq!(client.name(), ProviderId::DEEPL);
        assert_eq!(client.version(), "v2");
        assert!(client.as_sync().is_some());
        assert!(client.as_async().is_some());
    }
}
