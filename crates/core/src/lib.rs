pub mod alert;
pub mod circuit;
pub mod classification;
pub mod error;
pub mod fingerprint;
pub mod publish;
pub mod retry;
pub mod types;

pub use alert::{Alert, AlertStatus};
pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitState, PermitDecision};
pub use classification::{ClassificationVerdict, Severity, VerdictSource};
pub use error::{ApiError, ApiErrorBody, ErrorKind, GatewayError};
pub use fingerprint::fingerprint_labels;
pub use publish::{DlqEntry, Priority, PublishErrorKind, PublishJob};
pub use retry::RetryStrategy;
pub use types::{Fingerprint, JobId, ReceiverName, SilenceId};
