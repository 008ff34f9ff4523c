use alertgate_core::{Alert, ClassificationVerdict};
use async_trait::async_trait;

use crate::error::ClassifierError;

/// The remote model client contract. `HttpModelClient` is the production
/// implementation; tests use `MockModelClient`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn classify(&self, alert: &Alert) -> Result<ClassificationVerdict, ClassifierError>;
}
