//! Slack Web API receiver adapter.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::SlackConfig;
pub use error::SlackError;
pub use provider::SlackProvider;
pub use types::{SlackApiResponse, SlackAuthTestResponse};
