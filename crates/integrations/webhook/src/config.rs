use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Authentication method for the webhook endpoint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    Bearer(String),
    Basic { username: String, password: String },
    ApiKey { header: String, value: String },
    /// Signature computed as `HMAC-SHA256(secret, body)`, hex-encoded, sent
    /// in `header` prefixed `sha256=`.
    HmacSha256 { secret: String, header: String },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).field("password", &"[REDACTED]").finish()
            }
            Self::ApiKey { header, .. } => f.debug_struct("ApiKey").field("header", header).field("value", &"[REDACTED]").finish(),
            Self::HmacSha256 { header, .. } => {
                f.debug_struct("HmacSha256").field("secret", &"[REDACTED]").field("header", header).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub method: HttpMethod,
    pub auth: Option<AuthMethod>,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    /// HTTP status codes considered successful. Empty means any 2xx.
    pub success_status_codes: Vec<u16>,
}

impl WebhookConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            auth: None,
            headers: HashMap::new(),
            timeout: Duration::from_secs(10),
            success_status_codes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_success_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.success_status_codes = codes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = WebhookConfig::new("https://example.com/hook");
        assert_eq!(config.method, HttpMethod::Post);
        assert!(config.auth.is_none());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_methods() {
        let config = WebhookConfig::new("https://example.com")
            .with_method(HttpMethod::Put)
            .with_auth(AuthMethod::Bearer("tok".into()))
            .with_header("X-Custom", "val")
            .with_success_status_codes(vec![200, 201]);
        assert_eq!(config.method, HttpMethod::Put);
        assert!(config.auth.is_some());
        assert_eq!(config.headers.get("X-Custom").unwrap(), "val");
        assert_eq!(config.success_status_codes, vec![200, 201]);
    }

    #[test]
    fn auth_method_debug_redacts_secrets() {
        let bearer = AuthMethod::Bearer("super-secret-token".into());
        let debug = format!("{bearer:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }
}
