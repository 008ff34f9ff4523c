//! Silence CRUD store and the active-set matcher used during ingestion to
//! decide whether a firing alert's notification should be suppressed.

pub mod model;
pub mod store;

pub use model::{Silence, SilenceState};
pub use store::{SilenceError, SilenceStore};
