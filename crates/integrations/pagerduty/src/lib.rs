//! `PagerDuty` Events API v2 receiver adapter.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::PagerDutyConfig;
pub use error::PagerDutyError;
pub use provider::PagerDutyProvider;
pub use types::{PagerDutyApiResponse, PagerDutyEvent, PagerDutyImage, PagerDutyLink, PagerDutyPayload};
