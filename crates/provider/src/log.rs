use tracing::info;

use crate::error::ProviderError;
use crate::provider::Provider;

/// Adapter that logs the payload and returns success without performing any
/// external I/O. Useful for local development and route-tree smoke tests
/// that don't need a live receiver endpoint.
pub struct LogProvider {
    name: String,
}

impl LogProvider {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Provider for LogProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError> {
        info!(provider = %self.name, bytes = payload.len(), "log provider published payload");
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
