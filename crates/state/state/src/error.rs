use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("lock not held")]
    LockNotHeld,

    #[error("lock acquisition timed out")]
    LockTimeout,
}
