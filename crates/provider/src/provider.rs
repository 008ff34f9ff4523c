use async_trait::async_trait;

use crate::error::ProviderError;

/// Strongly-typed receiver adapter trait with native `async fn`.
///
/// Not object-safe (native `async fn` desugars to an opaque `impl Future`
/// return type). For dynamic dispatch across heterogeneous receiver types
/// use [`DynProvider`] — every `Provider` implements it via the blanket
/// impl below.
pub trait Provider: Send + Sync {
    /// The configured receiver name this adapter serves.
    fn name(&self) -> &str;

    /// Publish a pre-formatted payload to the receiver's endpoint.
    fn publish(&self, payload: &[u8]) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send;

    /// Perform a health check to verify the adapter's endpoint is reachable.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send;
}

/// Object-safe bridge over [`Provider`], used wherever receivers of
/// different concrete types must live behind `Arc<dyn DynProvider>` in the
/// same registry.
#[async_trait]
pub trait DynProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError>;
    async fn health_check(&self) -> Result<(), ProviderError>;
}

#[async_trait]
impl<T: Provider + Sync> DynProvider for T {
    fn name(&self) -> &str {
        Provider::name(self)
    }

    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError> {
        Provider::publish(self, payload).await
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Provider::health_check(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::PublishErrorKind;
    use std::sync::Arc;

    struct MockProvider {
        name: String,
        should_fail: bool,
    }

    impl Provider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn publish(&self, _payload: &[u8]) -> Result<(), ProviderError> {
            if self.should_fail {
                return Err(ProviderError::new(PublishErrorKind::Network, "mock failure"));
            }
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn blanket_dyn_provider_impl() {
        let provider: Arc<dyn DynProvider> = Arc::new(MockProvider { name: "dyn-test".into(), should_fail: false });
        assert_eq!(provider.name(), "dyn-test");
        provider.publish(b"{}").await.unwrap();
        provider.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn dyn_provider_publish_failure() {
        let provider: Arc<dyn DynProvider> = Arc::new(MockProvider { name: "sick".into(), should_fail: true });
        let err = provider.publish(b"{}").await.unwrap_err();
        assert_eq!(err.kind, PublishErrorKind::Network);
    }
}
