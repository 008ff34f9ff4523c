use std::collections::HashMap;
use std::sync::Arc;

use alertgate_core::ReceiverName;

use crate::error::ProviderError;
use crate::provider::DynProvider;

/// Lookup table from configured receiver name to its adapter, built once at
/// startup from configuration and treated as read-only thereafter.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ReceiverName, Arc<dyn DynProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, receiver: ReceiverName, provider: Arc<dyn DynProvider>) {
        self.providers.insert(receiver, provider);
    }

    #[must_use]
    pub fn get(&self, receiver: &ReceiverName) -> Option<Arc<dyn DynProvider>> {
        self.providers.get(receiver).cloned()
    }

    #[must_use]
    pub fn contains(&self, receiver: &ReceiverName) -> bool {
        self.providers.contains_key(receiver)
    }

    #[must_use]
    pub fn known_receivers(&self) -> std::collections::HashSet<ReceiverName> {
        self.providers.keys().cloned().collect()
    }

    pub async fn health_check_all(&self) -> HashMap<String, Result<(), ProviderError>> {
        let mut out = HashMap::new();
        for (name, provider) in &self.providers {
            out.insert(name.as_str().to_string(), provider.health_check().await);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use alertgate_core::PublishErrorKind;

    struct StubProvider;

    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn publish(&self, _payload: &[u8]) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Err(ProviderError::new(PublishErrorKind::Network, "down"))
        }
    }

    #[test]
    fn register_and_get_roundtrip() {
        let mut registry = ProviderRegistry::new();
        let name = ReceiverName::new("stub");
        registry.register(name.clone(), Arc::new(StubProvider));
        assert!(registry.contains(&name));
        assert!(registry.get(&name).is_some());
        assert!(registry.get(&ReceiverName::new("missing")).is_none());
    }

    #[tokio::test]
    async fn health_check_all_reports_per_receiver() {
        let mut registry = ProviderRegistry::new();
        registry.register(ReceiverName::new("stub"), Arc::new(StubProvider));
        let results = registry.health_check_all().await;
        assert!(results.get("stub").unwrap().is_err());
    }
}
