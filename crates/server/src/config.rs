//! Environment-variable configuration. No file format is introduced — every
//! tunable this binary needs is read from `std::env` with a default matching
//! the timeout table, the way `acteon-server`'s config module composes typed
//! structs from config sources, minus the file-parsing layer.

use std::collections::HashMap;
use std::time::Duration;

use alertgate_classifier::ClassifierConfig;
use alertgate_core::CircuitBreakerConfig;
use alertgate_inhibition::InhibitionRule;
use alertgate_publisher::{PublisherConfig, RetryConfig};
use alertgate_routing::RouteNode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error("{var} must be valid JSON: {reason}")]
    InvalidJson { var: &'static str, reason: String },
}

fn env_string(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_owned())
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue { var: var.to_owned(), reason: e.to_string() }),
        Err(_) => Ok(default),
    }
}

fn env_duration_secs(var: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue { var: var.to_owned(), reason: e.to_string() })?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

fn env_json<T: for<'de> Deserialize<'de>>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| ConfigError::InvalidJson { var, reason: e.to_string() }),
        Err(_) => Ok(None),
    }
}

/// HTTP listener configuration. Env: `BIND_HOST`, `BIND_PORT`.
#[derive(Debug, Clone)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout: Duration,
}

impl ListenConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_string("BIND_HOST", "0.0.0.0"),
            port: env_parsed("BIND_PORT", 8080u16)?,
            shutdown_timeout: env_duration_secs("SHUTDOWN_TIMEOUT_SECONDS", Duration::from_secs(30))?,
        })
    }
}

/// Bearer-token set accepted on protected endpoints. Env: `AUTH_TOKENS`
/// (comma-separated). A single compare against a small, fixed set — not a
/// full identity system, per the out-of-scope note on auth middleware.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub tokens: Vec<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let tokens = std::env::var("AUTH_TOKENS")
            .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect())
            .unwrap_or_default();
        Self { tokens }
    }
}

/// Env: `RATE_LIMIT_REQUESTS_PER_WINDOW`, `RATE_LIMIT_WINDOW_SECONDS`.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u64,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            requests_per_window: env_parsed("RATE_LIMIT_REQUESTS_PER_WINDOW", 1000u64)?,
            window: env_duration_secs("RATE_LIMIT_WINDOW_SECONDS", Duration::from_secs(60))?,
        })
    }
}

fn breaker_config_from_env(prefix: &str, default: CircuitBreakerConfig) -> Result<CircuitBreakerConfig, ConfigError> {
    Ok(CircuitBreakerConfig {
        failure_threshold: env_parsed(&format!("{prefix}_FAILURE_THRESHOLD"), default.failure_threshold)?,
        reset_after: env_duration_secs(&format!("{prefix}_RESET_AFTER_SECONDS"), default.reset_after)?,
        ..default
    })
}

/// Classifier tuning. Env: `CLASSIFIER_ENDPOINT`, `CLASSIFIER_API_KEY`,
/// `CLASSIFIER_MODEL`, `CLASSIFIER_CALL_TIMEOUT_SECONDS`,
/// `CLASSIFIER_CACHE_TTL_SECONDS`, `CLASSIFIER_BREAKER_FAILURE_THRESHOLD`,
/// `CLASSIFIER_BREAKER_RESET_AFTER_SECONDS`.
pub fn classifier_config_from_env() -> Result<ClassifierConfig, ConfigError> {
    let endpoint = env_string("CLASSIFIER_ENDPOINT", "http://localhost:9000");
    let api_key = env_string("CLASSIFIER_API_KEY", "");
    let model = env_string("CLASSIFIER_MODEL", "default");
    let mut cfg = ClassifierConfig::new(endpoint, api_key, model);
    cfg.call_timeout = env_duration_secs("CLASSIFIER_CALL_TIMEOUT_SECONDS", cfg.call_timeout)?;
    cfg.slow_call_threshold = env_duration_secs("CLASSIFIER_SLOW_CALL_THRESHOLD_SECONDS", cfg.slow_call_threshold)?;
    cfg.max_retries = env_parsed("CLASSIFIER_MAX_RETRIES", cfg.max_retries)?;
    cfg.cache_ttl = env_duration_secs("CLASSIFIER_CACHE_TTL_SECONDS", cfg.cache_ttl)?;
    cfg.l1_capacity = env_parsed("CLASSIFIER_L1_CAPACITY", cfg.l1_capacity)?;
    cfg.fallback_confidence_ceiling = env_parsed("CLASSIFIER_FALLBACK_CONFIDENCE_CEILING", cfg.fallback_confidence_ceiling)?;
    cfg.breaker = breaker_config_from_env("CLASSIFIER_BREAKER", cfg.breaker)?;
    Ok(cfg)
}

/// Publishing subsystem tuning. Env: `PUBLISHER_PER_RECEIVER_TIMEOUT_SECONDS`,
/// `PUBLISHER_FAN_OUT_CONCURRENCY`, `PUBLISHER_QUEUE_CAPACITY_PER_TIER`,
/// `PUBLISHER_BREAKER_FAILURE_THRESHOLD`, `PUBLISHER_BREAKER_RESET_AFTER_SECONDS`,
/// `PUBLISHER_RETRY_MAX_ATTEMPTS`.
pub fn publisher_config_from_env() -> Result<PublisherConfig, ConfigError> {
    let mut cfg = PublisherConfig::default();
    cfg.per_receiver_timeout = env_duration_secs("PUBLISHER_PER_RECEIVER_TIMEOUT_SECONDS", cfg.per_receiver_timeout)?;
    cfg.fan_out_concurrency = env_parsed("PUBLISHER_FAN_OUT_CONCURRENCY", cfg.fan_out_concurrency)?;
    cfg.queue_capacity_per_tier = env_parsed("PUBLISHER_QUEUE_CAPACITY_PER_TIER", cfg.queue_capacity_per_tier)?;
    cfg.breaker = breaker_config_from_env("PUBLISHER_BREAKER", cfg.breaker)?;
    let mut retry = RetryConfig::default();
    retry.max_attempts = env_parsed("PUBLISHER_RETRY_MAX_ATTEMPTS", retry.max_attempts)?;
    retry.per_receiver_timeout = env_duration_secs("PUBLISHER_RETRY_TIMEOUT_SECONDS", retry.per_receiver_timeout)?;
    cfg.retry = retry;
    Ok(cfg)
}

/// A typed, `receiver.type`-tagged descriptor sufficient to build both the
/// live `Provider` adapter and the `ReceiverKind` payload formatter for one
/// configured receiver. The factory that consumes this lives in `main.rs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReceiverConfig {
    Pagerduty { routing_key: String },
    Slack { token: String, channel: String },
    Webhook { url: String, bearer: Option<String> },
}

/// Env: `RECEIVERS_JSON` — `{name: ReceiverConfig}`. No file format is
/// introduced; a small JSON document in an environment variable is still
/// "configuration from environment", not a config file.
pub fn receivers_from_env() -> Result<HashMap<String, ReceiverConfig>, ConfigError> {
    Ok(env_json::<HashMap<String, ReceiverConfig>>("RECEIVERS_JSON")?.unwrap_or_default())
}

/// Env: `ROUTE_TREE_JSON` — a single `RouteNode` (the root). Falls back to a
/// root node with no matchers and no default receiver, which `RouteTree`
/// parsing rejects unless a receiver is actually configured; operators are
/// expected to always set this in a non-trivial deployment.
pub fn route_root_from_env() -> Result<RouteNode, ConfigError> {
    Ok(env_json::<RouteNode>("ROUTE_TREE_JSON")?.unwrap_or(RouteNode {
        matchers: Vec::new(),
        receiver: None,
        children: Vec::new(),
        continue_: false,
        group_by: Vec::new(),
        group_wait: None,
        group_interval: None,
        repeat_interval: None,
    }))
}

/// Env: `INHIBITION_RULES_JSON` — `Vec<InhibitionRule>`.
pub fn inhibition_rules_from_env() -> Result<Vec<InhibitionRule>, ConfigError> {
    Ok(env_json::<Vec<InhibitionRule>>("INHIBITION_RULES_JSON")?.unwrap_or_default())
}

/// Env: `ENRICHMENT_MODE` — the distributed-store/env/default resolution
/// fallback named in §4.7 and §6.
pub const ENRICHMENT_MODE_ENV_VAR: &str = "ENRICHMENT_MODE";

/// Namespace prefix shared by every `StateStore`-backed subsystem (silences,
/// DLQ, enrichment mode, classification L2 cache). Env: `STATE_NAMESPACE`.
#[must_use]
pub fn state_namespace_from_env() -> String {
    env_string("STATE_NAMESPACE", "alertgate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_config_parses_tagged_variants() {
        let raw = r##"{"oncall":{"type":"pagerduty","routing_key":"R1"},"ops":{"type":"slack","token":"xoxb-1","channel":"#ops"}}"##;
        let parsed: HashMap<String, ReceiverConfig> = serde_json::from_str(raw).unwrap();
        assert!(matches!(parsed.get("oncall"), Some(ReceiverConfig::Pagerduty { .. })));
        assert!(matches!(parsed.get("ops"), Some(ReceiverConfig::Slack { .. })));
    }

    #[test]
    fn listen_config_defaults_when_env_unset() {
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("BIND_PORT");
        }
        let cfg = ListenConfig::from_env().unwrap();
        assert_eq!(cfg.port, 8080);
    }
}
