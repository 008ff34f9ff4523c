//! The in-process active-alert cache and the inhibition rule evaluator that
//! reads it: "is there a firing source that suppresses this target".

pub mod active_cache;
pub mod rule;

pub use active_cache::ActiveAlertCache;
pub use rule::{should_inhibit, InhibitionRule};
