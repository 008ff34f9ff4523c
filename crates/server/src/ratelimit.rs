//! Fixed-window per-caller rate limiting with the `X-RateLimit-*` response
//! headers §6 requires on every endpoint. Grounded on the shape of
//! `acteon-server`'s `ratelimit` module (tiered, per-caller counters) without
//! its TOML-tier configuration — one tier, one window, from env.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use alertgate_core::{ErrorKind, GatewayError};

use crate::api::AppState;
use crate::config::RateLimitConfig;
use crate::error::ApiErrorResponse;

struct Window {
    started_at: Instant,
    count: u64,
}

/// One counter per caller key (bearer token, or `"anonymous"` when absent).
/// A fixed window resets wholesale once its duration elapses, rather than a
/// sliding log — simple, and sufficient at the scale this gateway targets.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
}

pub struct Decision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_after: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { windows: DashMap::new(), config }
    }

    fn check(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self.windows.entry(key.to_owned()).or_insert_with(|| Window { started_at: now, count: 0 });
        if now.duration_since(entry.started_at) >= self.config.window {
            entry.started_at = now;
            entry.count = 0;
        }
        let reset_after = self.config.window.saturating_sub(now.duration_since(entry.started_at));
        if entry.count >= self.config.requests_per_window {
            return Decision { allowed: false, limit: self.config.requests_per_window, remaining: 0, reset_after };
        }
        entry.count += 1;
        Decision {
            allowed: true,
            limit: self.config.requests_per_window,
            remaining: self.config.requests_per_window - entry.count,
            reset_after,
        }
    }
}

fn caller_key(req: &Request<Body>) -> String {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "anonymous".to_owned())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request<Body>, next: Next) -> Result<Response, ApiErrorResponse> {
    let key = caller_key(&req);
    let decision = state.rate_limiter.check(&key, Instant::now());

    if !decision.allowed {
        let err = GatewayError::new(ErrorKind::RateLimitExceeded, "rate limit exceeded");
        return Err(ApiErrorResponse::new(err, uuid::Uuid::new_v4().to_string()));
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(decision.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_after.as_secs()));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = RateLimiter::new(RateLimitConfig { requests_per_window: 2, window: Duration::from_secs(60) });
        let now = Instant::now();
        assert!(limiter.check("caller", now).allowed);
        assert!(limiter.check("caller", now).allowed);
        assert!(!limiter.check("caller", now).allowed);
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = RateLimiter::new(RateLimitConfig { requests_per_window: 1, window: Duration::from_millis(10) });
        let now = Instant::now();
        assert!(limiter.check("caller", now).allowed);
        assert!(!limiter.check("caller", now).allowed);
        let later = now + Duration::from_millis(20);
        assert!(limiter.check("caller", later).allowed);
    }

    #[test]
    fn callers_are_tracked_independently() {
        let limiter = RateLimiter::new(RateLimitConfig { requests_per_window: 1, window: Duration::from_secs(60) });
        let now = Instant::now();
        assert!(limiter.check("a", now).allowed);
        assert!(limiter.check("b", now).allowed);
    }
}
