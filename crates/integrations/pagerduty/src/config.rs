/// Configuration for the `PagerDuty` provider.
#[derive(Debug, Clone)]
pub struct PagerDutyConfig {
    /// Integration routing key used to authenticate events.
    pub routing_key: String,

    /// Base URL for the `PagerDuty` Events API. Override this for testing
    /// against a mock server.
    pub api_base_url: String,
}

impl PagerDutyConfig {
    /// Create a new configuration with the given routing key.
    ///
    /// Uses the default `PagerDuty` Events API base URL
    /// (`https://events.pagerduty.com`).
    pub fn new(routing_key: impl Into<String>) -> Self {
        Self { routing_key: routing_key.into(), api_base_url: "https://events.pagerduty.com".to_owned() }
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
